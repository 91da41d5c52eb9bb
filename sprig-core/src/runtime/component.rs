//! Component invocation.
//!
//! Calling a component means: find or create its fiber, make that fiber
//! the active render context, call the function with the element's
//! attributes, and record what it returned. Mounting the returned tree is
//! the render pass's job; patching it is the reconciler's.

use tracing::{debug, warn};

use super::context::{render_in_progress, run_scoped, RenderContext};
use super::fiber::{get_or_create_fiber, MountPoint, WeakFiber};
use crate::element::{Element, ElementKind, Node};
use crate::error::{Error, Result};
use crate::reconcile::reconcile;

/// Invoke a component element without mounting its output.
///
/// With `mount` the fiber remembers where its output lives, so later state
/// updates re-render and patch the host; with `None` the fiber keeps its
/// previous mount point (a fresh fiber has none, and its state updates only
/// store the new value).
///
/// An intrinsic element renders to itself.
pub fn render_component(element: &Element, mount: Option<MountPoint>) -> Result<Node> {
    run_scoped(|| invoke(element, mount))
}

pub(crate) fn invoke(element: &Element, mount: Option<MountPoint>) -> Result<Node> {
    let component = match element.kind() {
        ElementKind::Component(component) => component,
        ElementKind::Tag(_) => return Ok(Node::Element(element.clone())),
    };

    let fiber = get_or_create_fiber(element, mount);
    let output = {
        let _ctx = RenderContext::enter(&fiber);
        component.call(element.props())?
    };

    fiber.finish_render(output.clone());
    Ok(output)
}

/// Re-render the fiber behind a state updater and patch its host subtree.
pub(crate) fn rerender(fiber: &WeakFiber) -> Result<()> {
    if render_in_progress() {
        return Err(Error::UpdateDuringRender);
    }

    let Some(fiber) = fiber.upgrade() else {
        debug!("state update for a dropped fiber ignored");
        return Ok(());
    };
    let Some(owner) = fiber.owner() else {
        warn!(component = %fiber.name(), "state update for an unmounted component ignored");
        return Ok(());
    };
    let Some(mount) = fiber.mount() else {
        debug!(component = %fiber.name(), "state stored for a detached component");
        return Ok(());
    };

    debug!(component = %fiber.name(), fiber = fiber.id().raw(), "state update re-render");
    run_scoped(|| {
        let previous = fiber.last_output();
        let next = invoke(&owner, None)?;
        let anchor = mount.next_sibling_host();
        reconcile(
            &mount.host,
            mount.container,
            &mount.parent,
            &previous,
            &next,
            mount.position,
            anchor,
        )?;
        owner.set_host(next.host());
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{h, Component};
    use crate::runtime::RenderContext;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn calls_component_and_returns_output() {
        let hello = Component::new("Hello", |_| Ok(h("div", None, vec!["Hello".into()]).into()));
        let output = render_component(&h(&hello, None, vec![]), None).unwrap();
        assert_eq!(output, Node::from(h("div", None, vec!["Hello".into()])));
    }

    #[test]
    fn passes_props() {
        let echo = Component::new("Echo", |props| {
            Ok(h("div", None, vec![props.str("message").unwrap_or_default().into()]).into())
        });
        let element = h(&echo, crate::element::attrs([("message", "Test")]), vec![]);
        let output = render_component(&element, None).unwrap();
        assert_eq!(output, Node::from(h("div", None, vec!["Test".into()])));
    }

    #[test]
    fn absent_props_are_visible() {
        let sample = Component::new("Sample", |props| {
            Ok(Node::text(if props.is_absent() { "No props" } else { "Has props" }))
        });
        assert_eq!(
            render_component(&h(&sample, None, vec![]), None).unwrap(),
            Node::text("No props")
        );
        assert_eq!(
            render_component(&h(&sample, Some(Default::default()), vec![]), None).unwrap(),
            Node::text("Has props")
        );
    }

    #[test]
    fn sets_and_restores_current_fiber() {
        let captured = Rc::new(RefCell::new(None));
        let captured_clone = captured.clone();
        let sample = Component::new("Sample", move |_| {
            *captured_clone.borrow_mut() = RenderContext::current_fiber();
            assert_eq!(RenderContext::cursor(), Some(0));
            Ok(Node::Empty)
        });
        let element = h(&sample, None, vec![]);

        render_component(&element, None).unwrap();

        assert_eq!(*captured.borrow(), element.fiber());
        assert!(RenderContext::current_fiber().is_none());
    }

    #[test]
    fn nested_component_renders_restore_outer_frame() {
        let frames = Rc::new(RefCell::new(Vec::new()));

        let child_frames = frames.clone();
        let child = Component::new("Child", move |_| {
            child_frames
                .borrow_mut()
                .push(("child", RenderContext::current_fiber(), RenderContext::cursor()));
            Ok(h("span", None, vec!["Child".into()]).into())
        });

        let parent_frames = frames.clone();
        let parent = Component::new("Parent", move |_| {
            parent_frames
                .borrow_mut()
                .push(("before", RenderContext::current_fiber(), RenderContext::cursor()));
            render_component(&h(&child, None, vec![]), None)?;
            parent_frames
                .borrow_mut()
                .push(("after", RenderContext::current_fiber(), RenderContext::cursor()));
            Ok(h("div", None, vec!["Parent".into()]).into())
        });

        render_component(&h(&parent, None, vec![]), None).unwrap();

        let frames = frames.borrow();
        let (_, before, before_cursor) = &frames[0];
        let (_, inner, inner_cursor) = &frames[1];
        let (_, after, after_cursor) = &frames[2];
        assert_eq!(before, after);
        assert_ne!(before, inner);
        assert_eq!((*before_cursor, *inner_cursor, *after_cursor), (Some(0), Some(0), Some(0)));
    }

    #[test]
    fn returns_empty_and_text() {
        let empty = Component::new("Empty", |_| Ok(Node::Empty));
        let text = Component::new("Text", |_| Ok(Node::text("Hello")));
        assert!(render_component(&h(&empty, None, vec![]), None).unwrap().is_empty());
        assert_eq!(
            render_component(&h(&text, None, vec![]), None).unwrap(),
            Node::text("Hello")
        );
    }

    #[test]
    fn reuses_fiber_and_counts_renders() {
        let sample = Component::new("Sample", |_| Ok(Node::Empty));
        let element = h(&sample, None, vec![]);

        render_component(&element, None).unwrap();
        let first = element.fiber().unwrap();
        render_component(&element, None).unwrap();
        let second = element.fiber().unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(second.render_count(), 2);
        assert!(second.owner().unwrap().ptr_eq(&element));
    }

    #[test]
    fn separate_elements_get_separate_fibers() {
        let sample = Component::new("Sample", |_| Ok(Node::Empty));
        let a = h(&sample, None, vec![]);
        let b = h(&sample, None, vec![]);
        render_component(&a, None).unwrap();
        render_component(&b, None).unwrap();
        assert_ne!(a.fiber(), b.fiber());
    }

    #[test]
    fn component_error_propagates_and_context_is_restored() {
        let failing =
            Component::new("Failing", |_| Err(Error::component("Failing", "Component error")));
        let element = h(&failing, None, vec![]);

        let err = render_component(&element, None).unwrap_err();
        assert_eq!(err, Error::component("Failing", "Component error"));
        assert!(!RenderContext::is_active());

        // The faulted fiber keeps its previous output.
        assert_eq!(element.fiber().unwrap().render_count(), 0);
    }

    #[test]
    fn intrinsic_element_renders_to_itself() {
        let div = h("div", None, vec![]);
        let output = render_component(&div, None).unwrap();
        assert!(output.as_element().unwrap().ptr_eq(&div));
    }
}
