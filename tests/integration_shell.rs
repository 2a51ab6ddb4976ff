use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use overlay_wm::events::WindowEvent;
use overlay_wm::geometry::{FloatRect, Point};
use overlay_wm::host::SurfaceRole;
use overlay_wm::host::headless::HeadlessHost;
use overlay_wm::shell::Shell;
use overlay_wm::surface::Gesture;
use overlay_wm::window::{PlainWindow, WindowFlags, WindowId, WindowMode, WindowOptions};

fn shell() -> Shell<HeadlessHost> {
    Shell::new(HeadlessHost::default())
}

fn plain(shell: &mut Shell<HeadlessHost>, flags: WindowFlags) -> WindowId {
    shell.create_window(
        PlainWindow,
        WindowOptions::new()
            .with_min_size(200, 150)
            .with_flags(flags),
    )
}

fn geometry(shell: &Shell<HeadlessHost>, id: WindowId) -> FloatRect {
    shell.window(id).map(|w| w.geometry()).unwrap()
}

#[test]
fn at_most_one_window_is_focused() {
    let mut shell = shell();
    let ids: Vec<_> = (0..4)
        .map(|_| plain(&mut shell, WindowFlags::empty()))
        .collect();
    for id in &ids {
        shell.open(*id);
    }
    shell.focus(ids[1]);
    shell.unfocus_top();
    shell.focus(ids[3]);
    let focused: Vec<_> = shell
        .windows()
        .filter(|w| w.is_focused())
        .map(|w| w.id())
        .collect();
    assert_eq!(focused, vec![ids[3]]);
    assert_eq!(shell.stack().last(), Some(&ids[3]));
}

#[test]
fn second_window_pushes_first_to_a_snapshot() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::empty());
    let b = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    shell.open(b);

    let host = shell.host();
    assert!(host.is_attached(a, SurfaceRole::Proxy));
    assert!(host.proxy_has_image(a));
    assert!(!host.is_attached(a, SurfaceRole::Primary));
    assert!(host.is_attached(b, SurfaceRole::Primary));
    assert!(!host.is_attached(b, SurfaceRole::Proxy));
}

#[test]
fn opening_twice_attaches_once() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    shell.open(a);
    assert_eq!(shell.stack(), &[a]);
    assert_eq!(shell.host().attach_count(a, SurfaceRole::Primary), 1);
}

#[test]
fn positions_and_sizes_are_clamped_to_the_screen() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::RESIZABLE);
    shell.set_position(a, -500, -50);
    // two thirds of the width may leave the screen on the left
    assert_eq!(geometry(&shell, a), FloatRect::new(-134, 0, 200, 150));

    shell.set_position(a, 5000, 5000);
    assert_eq!(geometry(&shell, a), FloatRect::new(1080 - 66, 1920 - 75, 200, 150));

    shell.set_size(a, 10, 99_999);
    let g = geometry(&shell, a);
    assert_eq!((g.width, g.height), (200, 1920 - 24));
}

#[test]
fn no_limits_skips_position_clamping() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::NO_LIMITS);
    shell.set_position(a, -900, 4000);
    let g = geometry(&shell, a);
    assert_eq!((g.x, g.y), (-900, 4000));
}

#[test]
fn maximize_and_restore_round_trip() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::RESIZABLE);
    shell.open(a);
    shell.set_position(a, 50, 30);
    shell.set_mode(a, WindowMode::Maximized);
    assert_eq!(geometry(&shell, a), FloatRect::new(0, 0, 1080, 1920 - 80 - 16));

    // moving while maximized keeps the window pinned
    shell.set_position(a, 300, 300);
    assert_eq!(geometry(&shell, a).x, 0);

    shell.set_mode(a, WindowMode::Restored);
    assert_eq!(geometry(&shell, a), FloatRect::new(50, 30, 200, 150));
    assert!(shell.window(a).unwrap().saved_geometry().is_none());
}

#[test]
fn non_resizable_window_refuses_to_maximize() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    shell.set_position(a, 40, 40);
    shell.set_mode(a, WindowMode::Maximized);
    assert_eq!(shell.window(a).unwrap().mode(), WindowMode::Restored);
    assert_eq!(geometry(&shell, a), FloatRect::new(40, 40, 200, 150));
}

#[test]
fn minimize_round_trip_resumes_previous_mode() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::RESIZABLE);
    shell.open(a);
    shell.set_position(a, 700, 500);
    shell.set_mode(a, WindowMode::Maximized);
    shell.set_mode(a, WindowMode::Minimized);

    let window = shell.window(a).unwrap();
    assert_eq!(window.mode(), WindowMode::Minimized);
    assert!(!window.is_focused());
    assert!(shell.host().is_attached(a, SurfaceRole::Icon));

    // tapping the icon goes back to where the window came from
    let icon = shell.window(a).unwrap().surface(SurfaceRole::Icon).rect();
    let centre = Point::new(icon.x + icon.width / 2, icon.y + icon.height / 2);
    shell.dispatch_to(a, SurfaceRole::Icon, Gesture::Tap(centre));

    let window = shell.window(a).unwrap();
    assert_eq!(window.mode(), WindowMode::Maximized);
    assert!(window.is_focused());
    assert!(!shell.host().is_attached(a, SurfaceRole::Icon));
    assert!(shell.host().is_attached(a, SurfaceRole::Primary));

    shell.set_mode(a, WindowMode::Restored);
    assert_eq!(geometry(&shell, a), FloatRect::new(700, 500, 200, 150));
}

#[test]
fn dragging_the_action_bar_moves_the_window() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    assert_eq!(geometry(&shell, a), FloatRect::new(0, 0, 200, 150));

    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Down(Point::new(100, 5)));
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Move(Point::new(150, 35)));
    assert_eq!(geometry(&shell, a), FloatRect::new(50, 30, 200, 150));
    assert_eq!(
        shell.host().rect_of(a, SurfaceRole::Primary),
        Some(FloatRect::new(42, 22, 216, 206))
    );
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Up(Point::new(150, 35)));
    assert!(!shell.window(a).unwrap().surface(SurfaceRole::Primary).is_dragging());
}

#[test]
fn dragging_into_the_status_bar_maximizes() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::RESIZABLE);
    shell.open(a);
    shell.set_position(a, 100, 300);
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Down(Point::new(150, 305)));
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Move(Point::new(150, 10)));
    assert_eq!(shell.window(a).unwrap().mode(), WindowMode::Maximized);
}

#[test]
fn resize_anchor_grows_the_window() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::RESIZABLE);
    shell.open(a);
    shell.set_position(a, 100, 100);
    let rect = shell.window(a).unwrap().surface_rect();
    let corner = Point::new(rect.right() - 2, rect.bottom() - 2);
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Down(corner));
    shell.dispatch_to(
        a,
        SurfaceRole::Primary,
        Gesture::Move(Point::new(corner.x + 60, corner.y + 40)),
    );
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Up(corner));
    assert_eq!(geometry(&shell, a), FloatRect::new(100, 100, 260, 190));
}

#[test]
fn closing_mid_gesture_ignores_the_rest() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Down(Point::new(100, 5)));
    shell.close(a);
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Move(Point::new(400, 400)));
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Up(Point::new(400, 400)));

    assert!(!shell.is_open(a));
    assert_eq!(shell.host().surfaces().count(), 0);
    assert_eq!(geometry(&shell, a), FloatRect::new(0, 0, 200, 150));
}

#[test]
fn close_all_empties_the_stack() {
    let mut shell = shell();
    let ids: Vec<_> = (0..3)
        .map(|_| plain(&mut shell, WindowFlags::empty()))
        .collect();
    for id in &ids {
        shell.open(*id);
    }
    shell.set_mode(ids[0], WindowMode::Minimized);
    shell.close_all();
    assert!(shell.stack().is_empty());
    assert!(ids.iter().all(|id| !shell.is_open(*id)));
    assert_eq!(shell.host().surfaces().count(), 0);
    // the tick timer only stops on destroy
    assert_eq!(shell.host().active_timers(), 1);
    shell.destroy();
    assert_eq!(shell.host().active_timers(), 0);
}

#[test]
fn tick_reaches_every_open_window_once_per_interval() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let mut shell = shell();
    shell.set_listener(move |id: WindowId, event: WindowEvent| {
        if event == WindowEvent::Tick {
            sink.borrow_mut().push(id);
        }
    });
    let a = plain(&mut shell, WindowFlags::empty());
    let b = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    shell.open(b);
    assert_eq!(shell.host().active_timers(), 1);

    for token in shell.host_mut().advance(Duration::from_millis(499)) {
        shell.on_timer(token);
    }
    assert!(log.borrow().is_empty());
    for token in shell.host_mut().advance(Duration::from_millis(1)) {
        assert!(shell.on_timer(token));
    }
    assert_eq!(*log.borrow(), vec![a, b]);

    shell.close(a);
    for token in shell.host_mut().advance(Duration::from_millis(500)) {
        shell.on_timer(token);
    }
    assert_eq!(*log.borrow(), vec![a, b, b]);
}

#[test]
fn tapping_a_snapshot_brings_the_window_back() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::empty());
    let b = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    shell.open(b);
    shell.set_position(b, 600, 900);

    let proxy = shell.window(a).unwrap().surface(SurfaceRole::Proxy).rect();
    let touch = Point::new(proxy.x + 20, proxy.y + 20);
    let handle = shell
        .window(a)
        .unwrap()
        .surface(SurfaceRole::Proxy)
        .handle()
        .unwrap();
    assert_eq!(shell.surface_at(touch), Some((a, SurfaceRole::Proxy)));
    assert!(shell.dispatch_gesture(handle, Gesture::Tap(touch)));

    assert!(shell.window(a).unwrap().is_focused());
    assert!(shell.host().is_attached(a, SurfaceRole::Primary));
    assert!(shell.host().is_attached(b, SurfaceRole::Proxy));
    assert_eq!(shell.stack(), &[b, a]);
}

#[test]
fn drag_filter_vetoes_window_movement() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::RESIZABLE);
    shell.open(a);
    shell.with_window(a, |w, _| {
        w.set_drag_filter(
            SurfaceRole::Primary,
            Some(Box::new(|_touch: Point, proposed: Point| proposed.x < 100)),
        )
    });

    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Down(Point::new(100, 5)));
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Move(Point::new(150, 35)));
    assert_eq!(geometry(&shell, a), FloatRect::new(50, 30, 200, 150));

    // rejected: the raw drag keeps tracking, the window stays put
    shell.dispatch_to(a, SurfaceRole::Primary, Gesture::Move(Point::new(250, 10)));
    let window = shell.window(a).unwrap();
    assert_eq!(window.geometry(), FloatRect::new(50, 30, 200, 150));
    assert_eq!(
        window.surface(SurfaceRole::Primary).raw_position(),
        Point::new(142, -3)
    );
    // a vetoed move never snaps into the status bar
    assert_eq!(window.mode(), WindowMode::Restored);
}

#[test]
fn focusing_a_closed_window_is_ignored() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::empty());
    let b = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    shell.focus(b);
    assert_eq!(shell.stack(), &[a]);
    assert!(shell.window(a).unwrap().is_focused());
    assert!(!shell.window(b).unwrap().is_focused());
}

#[test]
fn no_limits_survives_extreme_positions() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::NO_LIMITS);
    shell.open(a);
    shell.set_position(a, i32::MIN, i32::MIN);
    assert_eq!((geometry(&shell, a).x, geometry(&shell, a).y), (i32::MIN, i32::MIN));
    let rect = shell.window(a).unwrap().surface_rect();
    assert_eq!((rect.x, rect.y), (i32::MIN, i32::MIN));

    shell.set_position(a, i32::MAX, i32::MAX);
    let window = shell.window(a).unwrap();
    assert_eq!(window.content_rect().y, i32::MAX);

    shell.set_mode(a, WindowMode::Minimized);
    assert!(shell.host().is_attached(a, SurfaceRole::Icon));
    assert!(shell.is_open(a));
}

#[test]
fn refused_attach_keeps_the_snapshot_on_screen() {
    let mut shell = shell();
    let a = plain(&mut shell, WindowFlags::empty());
    let b = plain(&mut shell, WindowFlags::empty());
    shell.open(a);
    shell.open(b);
    assert!(shell.host().is_attached(a, SurfaceRole::Proxy));

    shell.host_mut().set_fail_attach(true);
    shell.focus(a);
    assert!(shell.is_open(a));
    assert!(shell.host().is_attached(a, SurfaceRole::Proxy));
    assert!(!shell.host().is_attached(a, SurfaceRole::Primary));
    // b could not swap to its snapshot either, so its live surface stays
    assert!(shell.host().is_attached(b, SurfaceRole::Primary));
}
