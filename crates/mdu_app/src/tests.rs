//! Page scenarios for mdu_app
//!
//! A headless document with the four Sistema MDU filter controls laid out in
//! a row, driven through `PageContext` the way a host event loop would.

use std::cell::RefCell;
use std::rc::Rc;

use mdu_cn::{DropdownExt, WidgetEvent};
use mdu_core::error::MduError;
use mdu_core::geometry::{Point, Rect, Size};
use mdu_core::id::{ControlId, OverlayId};
use mdu_core::retry::RetryOutcome;
use mdu_layout::native::{MemorySelect, NativeOption};
use mdu_layout::overlay::OverlayCoordinatorExt;

use crate::config::MduConfig;
use crate::headless::HeadlessDocument;
use crate::page::{ClickTarget, Key, PageContext, PageEvent};

const IDS: [&str; 4] = ["filtroProjeto", "filtroSupervisor", "filtroEquipe", "filtroCidade"];

fn trigger_bounds(index: usize) -> Rect {
    Rect::new(index as f32 * 220.0, 100.0, 200.0, 32.0)
}

fn trigger_point(id: &str) -> Point {
    let index = IDS.iter().position(|i| *i == id).unwrap_or(0);
    let bounds = trigger_bounds(index);
    Point::new(bounds.x() + 100.0, bounds.y() + 16.0)
}

fn options_for(id: &str) -> MemorySelect {
    MemorySelect::multiple()
        .option("", "Selecione...")
        .option(format!("{id}-1"), "Norte")
        .option(format!("{id}-2"), "Sul")
        .option(format!("{id}-3"), "Leste")
}

fn populated_document() -> Rc<HeadlessDocument> {
    let document = Rc::new(HeadlessDocument::new());
    for (index, id) in IDS.iter().enumerate() {
        document.add_control(*id, options_for(id), trigger_bounds(index));
    }
    document
}

fn ready_page() -> (PageContext, Rc<HeadlessDocument>) {
    let page = PageContext::default();
    let document = populated_document();
    let handle = page.bootstrap(document.clone());
    assert_eq!(handle.outcome(), Some(RetryOutcome::Ready { attempts: 1 }));
    (page, document)
}

fn click_widget(id: &str, event: WidgetEvent) -> PageEvent {
    PageEvent::Click {
        point: trigger_point(id),
        target: Some(ClickTarget {
            control: ControlId::from(id),
            event,
        }),
    }
}

fn click_trigger(id: &str) -> PageEvent {
    click_widget(id, WidgetEvent::TriggerClicked)
}

fn is_open(page: &PageContext, id: &str) -> bool {
    page.widget(&ControlId::from(id))
        .map(|w| w.is_open())
        .unwrap_or(false)
}

// =============================================================================
// Bootstrap
// =============================================================================

#[test]
fn test_bootstrap_wraps_populated_controls() {
    let (page, document) = ready_page();

    let expected: Vec<ControlId> = IDS.iter().map(|i| ControlId::from(*i)).collect();
    assert_eq!(page.registry().ids(), expected);

    for control in &page.config().controls {
        let entry = document.get(&control.id.as_str().into()).unwrap();
        let target = entry.target.borrow();
        assert!(target.native_hidden);
        assert!(!target.expanded);
        assert_eq!(target.summary_text(), vec![control.placeholder.clone()]);
    }
}

#[test]
fn test_bootstrap_is_idempotent() {
    let (page, document) = ready_page();
    let before = page.widget(&"filtroEquipe".into()).unwrap();

    let handle = page.bootstrap(document.clone());
    assert!(handle.outcome().map(|o| o.is_ready()).unwrap_or(false));
    assert_eq!(page.registry().len(), 4);
    assert!(Rc::ptr_eq(&before, &page.widget(&"filtroEquipe".into()).unwrap()));
    assert!(page.init_control(&*document, &"filtroEquipe".into()).is_ok());
    assert_eq!(page.registry().len(), 4);
}

#[test]
fn test_init_control_reports_failures() {
    let page = PageContext::default();
    let document = populated_document();
    document.get(&"filtroCidade".into()).unwrap().select.borrow_mut().clear_options();

    assert!(matches!(
        page.init_control(&*document, &"filtroStatus".into()),
        Err(MduError::ControlNotFound(_))
    ));
    assert!(matches!(
        page.init_control(&*document, &"filtroCidade".into()),
        Err(MduError::Other(_))
    ));
    assert!(page.init_control(&*document, &"filtroProjeto".into()).is_ok());
    assert_eq!(page.registry().len(), 1);
}

#[test]
fn test_bootstrap_waits_for_async_population() {
    let page = PageContext::default();
    let document = populated_document();
    let cidade = document.get(&"filtroCidade".into()).unwrap();
    cidade.select.borrow_mut().clear_options();
    cidade.select.borrow_mut().push_option(NativeOption::new("", "Carregando..."));

    let handle = page.bootstrap(document.clone());
    assert!(!handle.is_finished());
    assert_eq!(page.registry().len(), 3);

    page.advance_to(700);
    cidade.select.borrow_mut().push_option(NativeOption::new("poa", "Porto Alegre"));
    page.advance_to(1000);

    assert_eq!(handle.outcome(), Some(RetryOutcome::Ready { attempts: 3 }));
    assert!(page.registry().contains(&"filtroCidade".into()));
}

#[test]
fn test_bootstrap_gives_up_after_max_attempts() {
    let config =
        MduConfig::from_toml_str("[bootstrap]\nmax_attempts = 3\nretry_interval_ms = 500\n")
            .unwrap();
    let page = PageContext::new(config);
    let document = populated_document();
    let cidade = document.get(&"filtroCidade".into()).unwrap();
    cidade.select.borrow_mut().clear_options();

    let handle = page.bootstrap(document.clone());
    page.advance_to(60_000);

    assert_eq!(handle.outcome(), Some(RetryOutcome::TimedOut { attempts: 3 }));
    assert_eq!(page.timers().pending(), 0);
    assert_eq!(page.registry().len(), 3);
    assert!(!cidade.target.borrow().native_hidden);
}

#[test]
fn test_bootstrap_skips_absent_and_single_controls() {
    let page = PageContext::default();
    let document = Rc::new(HeadlessDocument::new());
    document.add_control("filtroProjeto", options_for("filtroProjeto"), trigger_bounds(0));
    document.add_control(
        "filtroEquipe",
        MemorySelect::single().option("e", "Equipe"),
        trigger_bounds(2),
    );

    let handle = page.bootstrap(document);
    assert_eq!(handle.outcome(), Some(RetryOutcome::Ready { attempts: 1 }));
    assert_eq!(page.registry().ids(), vec![ControlId::from("filtroProjeto")]);
}

#[test]
fn test_cancelled_bootstrap_stops_retrying() {
    let page = PageContext::default();
    let document = populated_document();
    document.get(&"filtroCidade".into()).unwrap().select.borrow_mut().clear_options();

    let handle = page.bootstrap(document);
    handle.cancel();
    page.advance_to(60_000);

    assert_eq!(handle.outcome(), Some(RetryOutcome::Cancelled { attempts: 1 }));
    assert_eq!(page.timers().pending(), 0);
}

// =============================================================================
// Overlays
// =============================================================================

#[test]
fn test_trigger_clicks_enforce_mutual_exclusion() {
    let (page, _) = ready_page();

    for a in IDS {
        for b in IDS {
            if a == b {
                continue;
            }
            page.dispatch(click_trigger(a));
            page.dispatch(click_trigger(b));

            assert!(!is_open(&page, a), "{a} should close when {b} opens");
            assert!(is_open(&page, b));
            assert_eq!(page.open_overlay_ids(), vec![OverlayId::from(b)]);

            page.dispatch(click_trigger(b));
            assert!(page.open_overlay_ids().is_empty());
        }
    }
}

#[test]
fn test_stack_levels_increase_in_open_order() {
    let (page, document) = ready_page();

    page.dispatch(click_trigger("filtroProjeto"));
    assert_eq!(page.stack_level(&"filtroProjeto".into()), Some(1000));
    page.dispatch(click_trigger("filtroCidade"));
    assert_eq!(page.stack_level(&"filtroCidade".into()), Some(1001));
    page.dispatch(click_trigger("filtroProjeto"));
    assert_eq!(page.stack_level(&"filtroProjeto".into()), Some(1002));

    let projeto = document.get(&"filtroProjeto".into()).unwrap();
    let cidade = document.get(&"filtroCidade".into()).unwrap();
    assert_eq!(projeto.target.borrow().z_index(), Some(1002));
    assert_eq!(cidade.target.borrow().z_index(), None);
}

#[test]
fn test_click_outside_closes_everything() {
    let (page, _) = ready_page();
    page.dispatch(PageEvent::Click {
        point: Point::new(5.0, 5.0),
        target: None,
    });
    assert!(page.open_overlay_ids().is_empty());

    page.dispatch(click_trigger("filtroEquipe"));

    // Inside the open panel below the trigger
    let inside = Point::new(trigger_point("filtroEquipe").x, 300.0);
    page.dispatch(PageEvent::Click { point: inside, target: None });
    assert!(is_open(&page, "filtroEquipe"));

    page.dispatch(PageEvent::Click {
        point: Point::new(1500.0, 900.0),
        target: None,
    });
    assert!(!is_open(&page, "filtroEquipe"));
    assert!(page.open_overlay_ids().is_empty());
}

#[test]
fn test_option_clicks_inside_panel_keep_it_open() {
    let (page, document) = ready_page();
    page.dispatch(click_trigger("filtroSupervisor"));
    page.dispatch(click_widget(
        "filtroSupervisor",
        WidgetEvent::OptionToggled {
            value: "filtroSupervisor-2".into(),
            checked: true,
        },
    ));

    assert!(is_open(&page, "filtroSupervisor"));
    let control = document.get(&"filtroSupervisor".into()).unwrap().control;
    assert_eq!(control.selected_values(), vec!["filtroSupervisor-2"]);
}

#[test]
fn test_tag_removal_on_closed_widget_closes_other_overlay() {
    let (page, document) = ready_page();
    let cidade = page.widget(&"filtroCidade".into()).unwrap();
    cidade.set_option_selected("filtroCidade-1", true);

    page.dispatch(click_trigger("filtroProjeto"));
    assert!(!page.coordinator().borrow().contains_point(trigger_point("filtroCidade")));
    page.dispatch(click_widget(
        "filtroCidade",
        WidgetEvent::TagRemoveClicked("filtroCidade-1".into()),
    ));

    assert!(page.open_overlay_ids().is_empty());
    assert!(!is_open(&page, "filtroProjeto"));
    assert!(!is_open(&page, "filtroCidade"));
    let control = document.get(&"filtroCidade".into()).unwrap().control;
    assert!(control.selected_values().is_empty());
}

#[test]
fn test_tag_removal_keeps_own_widget_open() {
    let (page, document) = ready_page();
    let equipe = page.widget(&"filtroEquipe".into()).unwrap();
    equipe.set_option_selected("filtroEquipe-2", true);
    equipe.set_option_selected("filtroEquipe-3", true);

    page.dispatch(click_trigger("filtroEquipe"));
    page.dispatch(click_widget(
        "filtroEquipe",
        WidgetEvent::TagRemoveClicked("filtroEquipe-2".into()),
    ));

    assert!(is_open(&page, "filtroEquipe"));
    assert_eq!(page.open_overlay_ids(), vec![OverlayId::from("filtroEquipe")]);
    let control = document.get(&"filtroEquipe".into()).unwrap().control;
    assert_eq!(control.selected_values(), vec!["filtroEquipe-3"]);
}

#[test]
fn test_escape_handling() {
    let (page, _) = ready_page();

    page.dispatch(click_trigger("filtroEquipe"));
    page.dispatch(PageEvent::KeyDown(Key::Char('x')));
    assert!(is_open(&page, "filtroEquipe"));
    page.dispatch(PageEvent::KeyDown(Key::Escape));
    assert!(!is_open(&page, "filtroEquipe"));

    page.dispatch(click_trigger("filtroProjeto"));
    page.dispatch(PageEvent::Input {
        control: "filtroProjeto".into(),
        event: WidgetEvent::Escape,
    });
    assert!(!is_open(&page, "filtroProjeto"));
    assert!(page.top_overlay().is_none());
}

#[test]
fn test_native_multiselect_participates_in_exclusion() {
    let (page, document) = ready_page();
    let native = document.add_control(
        "filtroStatus",
        MemorySelect::multiple().option("ok", "Concluído"),
        Rect::new(0.0, 500.0, 200.0, 32.0),
    );
    page.dispatch(PageEvent::Resize(Size::new(1280.0, 640.0)));

    page.dispatch(click_trigger("filtroProjeto"));
    page.open_native("filtroStatus", native.native.clone());

    assert!(!is_open(&page, "filtroProjeto"));
    let presentation = native.native.borrow().presentation.unwrap();
    assert!(presentation.absolute);
    assert_eq!(presentation.expanded_height, Some(140.0));

    page.dispatch(PageEvent::Resize(Size::new(1280.0, 1024.0)));
    assert_eq!(native.native.borrow().presentation.unwrap().expanded_height, Some(200.0));

    page.dispatch(click_trigger("filtroCidade"));
    assert!(native.native.borrow().presentation.is_none());
    assert_eq!(page.open_overlay_ids(), vec![OverlayId::from("filtroCidade")]);

    page.open_native("filtroStatus", native.native.clone());
    assert!(page.close_native(&"filtroStatus".into()));
    assert!(!page.close_native(&"filtroStatus".into()));
}

#[test]
fn test_force_close_all_recovers() {
    let (page, document) = ready_page();
    page.dispatch(click_trigger("filtroSupervisor"));

    assert_eq!(page.force_close_all(), 1);
    assert!(!is_open(&page, "filtroSupervisor"));
    let target = document.get(&"filtroSupervisor".into()).unwrap().target;
    assert!(!target.borrow().expanded);
    assert_eq!(page.force_close_all(), 0);
}

#[test]
fn test_search_focus_follows_page_clock() {
    let (page, document) = ready_page();
    let target = document.get(&"filtroCidade".into()).unwrap().target;

    page.dispatch(click_trigger("filtroCidade"));
    page.advance_by(50);
    assert_eq!(target.borrow().focus_count, 0);
    page.advance_by(50);
    assert_eq!(target.borrow().focus_count, 1);

    page.dispatch(PageEvent::Input {
        control: "filtroCidade".into(),
        event: WidgetEvent::SearchInput("SU".into()),
    });
    assert_eq!(target.borrow().listed_values(), vec!["filtroCidade-2"]);
}

// =============================================================================
// Clear all
// =============================================================================

#[test]
fn test_clear_all_filters_runs_host_hooks_first() {
    let (page, document) = ready_page();
    for id in IDS {
        page.widget(&id.into())
            .unwrap()
            .set_option_selected(&format!("{id}-1"), true);
    }

    let seen = Rc::new(RefCell::new(Vec::new()));
    let projeto = document.get(&"filtroProjeto".into()).unwrap().control;
    let sink = Rc::clone(&seen);
    page.on_clear_filters(move || sink.borrow_mut().push(projeto.selected_values().len()));
    let sink = Rc::clone(&seen);
    let removed = page.on_clear_filters(move || sink.borrow_mut().push(99));
    assert!(page.remove_clear_hook(removed));

    page.clear_all_filters();

    assert_eq!(*seen.borrow(), vec![1]);
    for id in IDS {
        let entry = document.get(&id.into()).unwrap();
        assert!(entry.control.selected_values().is_empty());
        assert_eq!(entry.target.borrow().summary.len(), 1);
    }
}

#[test]
fn test_change_listener_sees_widget_state() {
    let (page, document) = ready_page();
    let equipe = document.get(&"filtroEquipe".into()).unwrap().control;
    let widget = page.widget(&"filtroEquipe".into()).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let reader = Rc::clone(&widget);
    equipe.on_change(move |event| {
        assert_eq!(event.selected, reader.selected_values());
        sink.borrow_mut().push(event.selected.clone());
    });

    page.dispatch(click_trigger("filtroEquipe"));
    page.dispatch(click_widget(
        "filtroEquipe",
        WidgetEvent::OptionToggled {
            value: "filtroEquipe-3".into(),
            checked: true,
        },
    ));
    page.dispatch(click_widget("filtroEquipe", WidgetEvent::ClearClicked));

    assert_eq!(*seen.borrow(), vec![vec!["filtroEquipe-3".to_string()], vec![]]);
    assert!(page.coordinator().is_open(&"filtroEquipe".into()));
}
