//! Generated keyframe rules.
//!
//! A css transition samples its style function into a `@keyframes` rule,
//! names it by content hash and registers it once per document. Each node
//! referencing a generated rule counts as one active animation; once the
//! count drops to zero, every document's generated rules are cleared on the
//! next frame (unless a new animation started meanwhile).

use std::cell::{Cell, RefCell};

use tracing::debug;

use crate::dom::{Dom, NodeId};
use crate::runtime::Runtime;
use crate::view::Scope;

use super::Easing;

/// Prefix of every generated animation name.
const PREFIX: &str = "__spark";

/// Sampling interval of one 60 fps frame, in milliseconds.
const FRAME_MS: f64 = 16.666;

#[derive(Default)]
pub(crate) struct StyleRegistry {
    active: Cell<usize>,
    docs: RefCell<Vec<Dom>>,
}

impl StyleRegistry {
    fn track(&self, document: &Dom) {
        let mut docs = self.docs.borrow_mut();
        if !docs.iter().any(|doc| doc.ptr_eq(document)) {
            docs.push(document.clone());
        }
    }

    pub(crate) fn active(&self) -> usize {
        self.active.get()
    }
}

/// String hash over UTF-16 code units, last to first.
pub fn hash(input: &str) -> u32 {
    let units: Vec<u16> = input.encode_utf16().collect();
    let mut hash: i32 = 5381;
    for unit in units.into_iter().rev() {
        hash = (hash << 5).wrapping_sub(hash) ^ i32::from(unit);
    }
    hash as u32
}

/// Keyframe body (`{ ... }`) animating from `a` to `b`.
fn keyframes(a: f64, b: f64, duration: f64, ease: Easing, css: &dyn Fn(f64, f64) -> String) -> String {
    let step = if duration > 0.0 {
        FRAME_MS / duration
    } else {
        f64::INFINITY
    };

    let mut rule = String::from("{\n");
    let mut p = 0.0;
    while p <= 1.0 {
        let t = a + (b - a) * ease(p);
        rule.push_str(&format!("{}%{{{}}}\n", p * 100.0, css(t, 1.0 - t)));
        p += step;
    }
    rule.push_str(&format!("100% {{{}}}\n}}", css(b, 1.0 - b)));
    rule
}

/// Generate (or reuse) a keyframe rule and append it to the node's
/// animation property. Returns the animation name.
#[allow(clippy::too_many_arguments)]
pub fn create_rule(
    cx: &Scope,
    node: NodeId,
    a: f64,
    b: f64,
    duration: f64,
    delay: f64,
    ease: Easing,
    css: &dyn Fn(f64, f64) -> String,
    uid: u64,
) -> String {
    let rule = keyframes(a, b, duration, ease, css);
    let name = format!("{PREFIX}_{}_{uid}", hash(&rule));

    let styles = &cx.runtime.inner().styles;
    styles.track(&cx.document);
    if cx.document.insert_keyframes(&name, &rule) {
        debug!(%name, "keyframes registered");
    }

    let current = cx.document.animation(node);
    let entry = format!("{name} {duration}ms linear {delay}ms 1 both");
    let animation = if current.is_empty() {
        entry
    } else {
        format!("{current}, {entry}")
    };
    cx.document.set_animation(node, &animation);

    styles.active.set(styles.active.get() + 1);
    name
}

/// Remove the named generated animation (or all of them) from a node.
pub fn delete_rule(cx: &Scope, node: NodeId, name: Option<&str>) {
    let current = cx.document.animation(node);
    if current.is_empty() {
        return;
    }

    let previous: Vec<&str> = current.split(", ").collect();
    let next: Vec<&str> = previous
        .iter()
        .copied()
        .filter(|animation| match name {
            Some(name) => !animation.contains(name),
            None => !animation.contains(PREFIX),
        })
        .collect();

    let deleted = previous.len() - next.len();
    if deleted == 0 {
        return;
    }

    cx.document.set_animation(node, &next.join(", "));
    let styles = &cx.runtime.inner().styles;
    let active = styles.active.get().saturating_sub(deleted);
    styles.active.set(active);
    if active == 0 {
        clear_rules(&cx.runtime);
    }
}

/// On the next frame, drop every generated rule if nothing is animating.
pub fn clear_rules(runtime: &Runtime) {
    let weak = runtime.downgrade();
    runtime.request_animation_frame(move |_| {
        let Some(runtime) = weak.upgrade() else { return };
        let styles = &runtime.inner().styles;
        if styles.active.get() > 0 {
            return;
        }
        let docs = std::mem::take(&mut *styles.docs.borrow_mut());
        for doc in &docs {
            doc.clear_stylesheet();
        }
        debug!(documents = docs.len(), "generated keyframes cleared");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::easing;

    fn scope() -> Scope {
        Scope::new(Runtime::new(), Dom::new())
    }

    fn opacity(t: f64, _u: f64) -> String {
        format!("opacity: {t}")
    }

    #[test]
    fn test_hash_known_values() {
        assert_eq!(hash(""), 5381);
        assert_eq!(hash("a"), 166906);
        assert_ne!(hash("ab"), hash("ba"));
    }

    #[test]
    fn test_keyframes_zero_duration_single_sample() {
        let rule = keyframes(0.0, 1.0, 0.0, easing::linear, &opacity);
        assert_eq!(rule, "{\n0%{opacity: 0}\n100% {opacity: 1}\n}");
    }

    #[test]
    fn test_keyframes_sampled_per_frame() {
        let rule = keyframes(0.0, 1.0, 100.0, easing::linear, &opacity);
        // 0, 16.666, ... 99.996 plus the closing 100% frame
        assert_eq!(rule.matches("%{").count(), 7);
        assert!(rule.ends_with("100% {opacity: 1}\n}"));
    }

    #[test]
    fn test_create_rule_appends_animation() {
        let cx = scope();
        let node = cx.document.element("p");

        let first = create_rule(&cx, node, 0.0, 1.0, 300.0, 0.0, easing::linear, &opacity, 0);
        let second = create_rule(&cx, node, 0.0, 1.0, 300.0, 50.0, easing::linear, &opacity, 1);

        assert!(first.starts_with("__spark_"));
        assert_eq!(
            cx.document.animation(node),
            format!("{first} 300ms linear 0ms 1 both, {second} 300ms linear 50ms 1 both")
        );
        assert_eq!(cx.document.rule_count(), 2);
        assert_eq!(cx.runtime.inner().styles.active(), 2);
    }

    #[test]
    fn test_identical_rules_registered_once() {
        let cx = scope();
        let a = cx.document.element("p");
        let b = cx.document.element("p");

        let first = create_rule(&cx, a, 0.0, 1.0, 300.0, 0.0, easing::linear, &opacity, 0);
        let second = create_rule(&cx, b, 0.0, 1.0, 300.0, 0.0, easing::linear, &opacity, 0);

        assert_eq!(first, second);
        assert_eq!(cx.document.rule_count(), 1);
        assert_eq!(cx.runtime.inner().styles.active(), 2);
    }

    #[test]
    fn test_delete_rule_clears_on_next_frame() {
        let cx = scope();
        let node = cx.document.element("p");
        let name = create_rule(&cx, node, 0.0, 1.0, 300.0, 0.0, easing::linear, &opacity, 0);

        delete_rule(&cx, node, Some(&name));
        assert_eq!(cx.document.animation(node), "");
        assert_eq!(cx.document.rule_count(), 1);

        cx.runtime.run_frame(16.0);
        assert_eq!(cx.document.rule_count(), 0);
    }

    #[test]
    fn test_clear_skipped_when_animation_restarts() {
        let cx = scope();
        let node = cx.document.element("p");
        delete_rule(&cx, node, None);

        let name = create_rule(&cx, node, 0.0, 1.0, 300.0, 0.0, easing::linear, &opacity, 0);
        delete_rule(&cx, node, Some(&name));
        create_rule(&cx, node, 0.0, 1.0, 300.0, 0.0, easing::linear, &opacity, 1);

        cx.runtime.run_frame(16.0);
        assert_eq!(cx.document.rule_count(), 2);
    }

    #[test]
    fn test_delete_all_keeps_foreign_animations() {
        let cx = scope();
        let node = cx.document.element("p");
        cx.document.set_animation(node, "spin 1s linear");
        create_rule(&cx, node, 0.0, 1.0, 300.0, 0.0, easing::linear, &opacity, 0);

        delete_rule(&cx, node, None);
        assert_eq!(cx.document.animation(node), "spin 1s linear");
        assert_eq!(cx.runtime.inner().styles.active(), 0);
    }
}
