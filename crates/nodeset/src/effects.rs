//! Opacity fades built on the tween scheduler
//!
//! Each element gets its own tween, registered with `Page::animate` under
//! `AnimatedProperty::Opacity`, so a new fade on an element supersedes the
//! one in flight instead of racing it.

use std::rc::Rc;

use nodeset_dom::NodeId;

use crate::manipulate::{computed_display, set_style, visible_display};
use crate::page::WeakPage;
use crate::tween::{AnimatedProperty, Tween};
use crate::{Collection, Page};

/// Completion callback shared by every element of one fade call
pub type Callback = Rc<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    In,
    Out,
}

impl Collection {
    /// Make every element visible at opacity 0, then ramp opacity to 1.
    /// `on_complete` runs once per element.
    pub fn fade_in(&mut self, duration_ms: f64, on_complete: Option<Callback>) -> &mut Self {
        self.fade(duration_ms, on_complete, |_| Direction::In)
    }

    /// Ramp opacity to 0, then set `display: none`
    pub fn fade_out(&mut self, duration_ms: f64, on_complete: Option<Callback>) -> &mut Self {
        self.fade(duration_ms, on_complete, |_| Direction::Out)
    }

    /// Fade in elements whose display is `none` right now, fade out the rest.
    ///
    /// The direction comes from the display value at call time, not from
    /// any fade still in flight.
    pub fn fade_toggle(&mut self, duration_ms: f64, on_complete: Option<Callback>) -> &mut Self {
        self.fade(duration_ms, on_complete, |display| {
            if display == "none" { Direction::In } else { Direction::Out }
        })
    }

    pub fn fade_in_default(&mut self) -> &mut Self {
        let duration = self.page().config().default_fade_ms;
        self.fade_in(duration, None)
    }

    pub fn fade_out_default(&mut self) -> &mut Self {
        let duration = self.page().config().default_fade_ms;
        self.fade_out(duration, None)
    }

    pub fn fade_toggle_default(&mut self) -> &mut Self {
        let duration = self.page().config().default_fade_ms;
        self.fade_toggle(duration, None)
    }

    fn fade(
        &mut self,
        duration_ms: f64,
        on_complete: Option<Callback>,
        direction: impl Fn(&str) -> Direction,
    ) -> &mut Self {
        let page = self.page().clone();
        for node in self.element_members() {
            let display = page.with_tree(|tree| computed_display(tree, node));
            let tween = match direction(&display) {
                Direction::In => fade_in_tween(&page, node, duration_ms),
                Direction::Out => fade_out_tween(&page, node, duration_ms),
            };
            let tween = match on_complete.clone() {
                Some(callback) => tween.on_complete(move || callback()),
                None => tween,
            };
            page.animate(node, AnimatedProperty::Opacity, tween);
        }
        self
    }
}

fn fade_in_tween(page: &Page, node: NodeId, duration_ms: f64) -> Tween {
    page.with_tree_mut(|tree| {
        let display = visible_display(tree, node);
        set_style(tree, node, "display", display);
        set_style(tree, node, "opacity", "0");
    });
    let weak = page.downgrade();
    Tween::new(duration_ms, move |progress| {
        write_opacity(&weak, node, progress);
    })
}

fn fade_out_tween(page: &Page, node: NodeId, duration_ms: f64) -> Tween {
    let weak = page.downgrade();
    Tween::new(duration_ms, move |progress| {
        write_opacity(&weak, node, 1.0 - progress);
        if progress >= 1.0 {
            if let Some(page) = weak.upgrade() {
                page.with_tree_mut(|tree| set_style(tree, node, "display", "none"));
            }
        }
    })
}

fn write_opacity(page: &WeakPage, node: NodeId, opacity: f64) {
    if let Some(page) = page.upgrade() {
        let value = format_opacity(opacity);
        page.with_tree_mut(|tree| set_style(tree, node, "opacity", &value));
    }
}

/// Shortest decimal form: `0`, `0.25`, `1`
fn format_opacity(opacity: f64) -> String {
    format!("{}", opacity.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::PlayState;
    use crate::Config;
    use std::cell::Cell;

    fn page(html: &str) -> Page {
        Page::from_html(html, Config::default()).unwrap()
    }

    #[test]
    fn test_format_opacity() {
        assert_eq!(format_opacity(0.0), "0");
        assert_eq!(format_opacity(0.25), "0.25");
        assert_eq!(format_opacity(1.0), "1");
        assert_eq!(format_opacity(1.5), "1");
    }

    #[test]
    fn test_fade_out_terminal_state() {
        let page = page("<div id=\"d\">x</div>");
        let mut div = page.wrap("#d").unwrap();
        div.fade_out(200.0, None);

        page.run_frame(0.0);
        assert_eq!(div.get_css("opacity").as_deref(), Some("1"));
        assert_eq!(div.get_css("display"), None);
        page.run_frame(100.0);
        assert_eq!(div.get_css("opacity").as_deref(), Some("0.5"));
        page.run_frame(200.0);

        assert_eq!(div.get_css("display").as_deref(), Some("none"));
        assert_eq!(div.get_css("opacity").as_deref(), Some("0"));
        assert_eq!(page.pending_frames(), 0);
    }

    #[test]
    fn test_fade_in_uses_tag_display() {
        let page = page("<span style=\"display: none\">x</span>");
        let mut span = page.wrap("span").unwrap();
        span.fade_in(100.0, None);
        assert_eq!(span.get_css("display").as_deref(), Some("inline"));
        assert_eq!(span.get_css("opacity").as_deref(), Some("0"));

        page.run_frame(0.0);
        page.run_frame(100.0);
        assert_eq!(span.get_css("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_fade_in_shows_hidden_by_default_tags() {
        let page = page("<div></div>");
        let mut template = page.wrap(page.create_element("template")).unwrap();
        template.fade_in(50.0, None);
        assert_eq!(template.get_css("display").as_deref(), Some("block"));
        assert_eq!(template.computed_display().as_deref(), Some("block"));
    }

    #[test]
    fn test_fade_out_then_fade_in_from_callback() {
        let page = page("<div id=\"d\">x</div>");
        let node = page.get_element_by_id("d").unwrap();
        let inner = page.clone();
        let reshow: Callback = Rc::new(move || {
            if let Ok(mut div) = inner.wrap(node) {
                div.fade_in(100.0, None);
            }
        });

        page.wrap(node).unwrap().fade_out(100.0, Some(reshow));
        let first = page.animation(node, &AnimatedProperty::Opacity).unwrap();
        page.advance(150.0);

        assert_eq!(first.state(), PlayState::Completed);
        let second = page.animation(node, &AnimatedProperty::Opacity).unwrap();
        assert!(second.is_active());
        page.advance(200.0);

        assert_eq!(second.state(), PlayState::Completed);
        let div = page.wrap(node).unwrap();
        assert_eq!(div.computed_display().as_deref(), Some("block"));
        assert_eq!(div.get_css("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_callback_once_per_element() {
        let page = page("<p>a</p><p>b</p>");
        let done = Rc::new(Cell::new(0));
        let d = Rc::clone(&done);
        let callback: Callback = Rc::new(move || d.set(d.get() + 1));

        page.wrap("p").unwrap().fade_out(50.0, Some(callback));
        page.advance(200.0);
        assert_eq!(done.get(), 2);
    }

    #[test]
    fn test_fade_toggle_reads_display_at_call_time() {
        let page = page("<p id=\"shown\">a</p><p id=\"hidden\" style=\"display:none\">b</p>");
        page.wrap("p").unwrap().fade_toggle(100.0, None);
        page.advance(200.0);

        let shown = page.wrap("#shown").unwrap();
        let hidden = page.wrap("#hidden").unwrap();
        assert_eq!(shown.computed_display().as_deref(), Some("none"));
        assert_eq!(hidden.computed_display().as_deref(), Some("block"));
        assert_eq!(hidden.get_css("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_second_fade_supersedes_first() {
        let page = page("<div>x</div>");
        let mut div = page.wrap("div").unwrap();
        let node = div.first().unwrap();

        div.fade_out(100.0, None);
        page.run_frame(0.0);
        let first = page.animation(node, &AnimatedProperty::Opacity).unwrap();

        div.fade_in(100.0, None);
        assert_eq!(first.state(), PlayState::Cancelled);
        page.advance(300.0);

        assert_eq!(div.get_css("opacity").as_deref(), Some("1"));
        assert_eq!(div.computed_display().as_deref(), Some("block"));
    }

    #[test]
    fn test_dropped_page_ends_animation() {
        let page = page("<div>x</div>");
        let weak = page.downgrade();
        page.wrap("div").unwrap().fade_out_default();
        drop(page);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_non_elements_skipped() {
        let page = page("<p>text</p>");
        let text = page.document().tree().first_child(page.wrap("p").unwrap().first().unwrap());
        let mut c = page.wrap(text).unwrap();
        c.fade_out(10.0, None);
        assert_eq!(page.pending_frames(), 0);
    }
}
