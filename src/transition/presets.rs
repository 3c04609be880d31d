//! Ready-made transitions.

use std::rc::Rc;

use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};

use super::{TransitionConfig, TransitionSpec};

/// Default milliseconds per revealed character.
pub const TYPEWRITER_SPEED: f64 = 30.0;

/// Reveal a node's text one character at a time, `speed` ms per character.
///
/// The node must have exactly one child, and it must be a text node.
/// A non-finite or negative `speed` falls back to [`TYPEWRITER_SPEED`].
pub fn typewriter(dom: &Dom, node: NodeId, speed: f64) -> Result<TransitionSpec> {
    let children = dom.children(node);
    let valid = children.len() == 1 && dom.is_text(children[0]);
    if !valid {
        return Err(Error::transition(
            "typewriter only works on elements with a single text node child",
        ));
    }

    let speed = if speed.is_finite() && speed >= 0.0 { speed } else { TYPEWRITER_SPEED };
    let text: Rc<[char]> = dom.text_content(node).chars().collect();
    let duration = text.len() as f64 * speed;
    let dom = dom.clone();

    Ok(TransitionConfig::default()
        .duration(duration)
        .tick(move |t, _| {
            let shown = (text.len() as f64 * t).floor() as usize;
            let visible: String = text.iter().take(shown).collect();
            dom.set_text_content(node, &visible);
        })
        .into())
}

/// Fade opacity in.
pub fn fade(delay: f64, duration: f64) -> TransitionSpec {
    TransitionConfig::default()
        .delay(delay)
        .duration(duration)
        .css(|t, _| format!("opacity: {}", t))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(spec: TransitionSpec) -> TransitionConfig {
        match spec {
            TransitionSpec::Ready(config) => config,
            TransitionSpec::Lazy(compute) => compute(),
        }
    }

    #[test]
    fn test_typewriter_duration_and_reveal() {
        let dom = Dom::new();
        let p = dom.element("p");
        dom.append(p, dom.text("hello"));

        let config = config(typewriter(&dom, p, 30.0).unwrap());
        assert_eq!(config.duration, 150.0);

        config.run_tick(0.0, 1.0);
        assert_eq!(dom.text_content(p), "");
        config.run_tick(0.5, 0.5);
        assert_eq!(dom.text_content(p), "he");
        config.run_tick(1.0, 0.0);
        assert_eq!(dom.text_content(p), "hello");
    }

    #[test]
    fn test_typewriter_counts_chars_not_bytes() {
        let dom = Dom::new();
        let p = dom.element("p");
        dom.append(p, dom.text("héllo"));

        let config = config(typewriter(&dom, p, 10.0).unwrap());
        assert_eq!(config.duration, 50.0);
        config.run_tick(0.4, 0.6);
        assert_eq!(dom.text_content(p), "hé");
    }

    #[test]
    fn test_typewriter_invalid_speed_uses_default() {
        let dom = Dom::new();
        let p = dom.element("p");
        dom.append(p, dom.text("abc"));
        for speed in [f64::NAN, -1.0, f64::INFINITY] {
            let config = config(typewriter(&dom, p, speed).unwrap());
            assert_eq!(config.duration, 3.0 * TYPEWRITER_SPEED);
        }
    }

    #[test]
    fn test_typewriter_run_keeps_arena_size() {
        let dom = Dom::new();
        let p = dom.element("p");
        dom.append(p, dom.text(&"x".repeat(200)));
        let config = config(typewriter(&dom, p, 30.0).unwrap());

        config.run_tick(0.0, 1.0);
        config.run_tick(0.01, 0.99);
        let slots = dom.slot_count();
        let mut revisions = 0;
        for frame in 1..=400 {
            let before = dom.revision();
            let t = (frame as f64 / 400.0).min(1.0);
            config.run_tick(t, 1.0 - t);
            if dom.revision() != before {
                revisions += 1;
            }
        }

        assert_eq!(dom.slot_count(), slots);
        assert_eq!(dom.text_content(p).len(), 200);
        // One bump per newly revealed character
        assert!(revisions <= 200);
    }

    #[test]
    fn test_typewriter_rejects_invalid_children() {
        let dom = Dom::new();
        let empty = dom.element("p");
        assert!(matches!(typewriter(&dom, empty, 30.0), Err(Error::Transition(_))));

        let nested = dom.element("p");
        dom.append(nested, dom.element("span"));
        assert!(typewriter(&dom, nested, 30.0).is_err());

        let two = dom.element("p");
        dom.append(two, dom.text("a"));
        dom.append(two, dom.text("b"));
        assert!(typewriter(&dom, two, 30.0).is_err());
    }

    #[test]
    fn test_fade_css() {
        let config = config(fade(10.0, 200.0));
        assert_eq!(config.delay, 10.0);
        let css = config.css.unwrap();
        assert_eq!(css(0.5, 0.5), "opacity: 0.5");
    }
}
