//! Render Adapter: applies fact-level render operations to the host surface.
//!
//! Invariants:
//! - Operations are applied in order.
//! - A batch is validated before anything is mutated; a `CreateRoot` whose
//!   instance neither exists nor is created earlier in the same batch rejects
//!   the whole batch.
//! - Attribute writes are never dropped. Unknown attributes pass through as
//!   literal attributes after value interning.
//! - Writes to instances the directory does not know are ignored.

use crate::config::TagNames;
use crate::deferred::{Deferred, DeferredQueue};
use crate::directory::{InstanceDirectory, InstanceRecord};
use crate::pending::PendingInputs;
use core_types::{InstanceId, Interner, Value, maybe_intern};
use dom::{HostSurface, NodeKey};
use std::collections::HashSet;
use std::sync::Arc;

/// One fact-level render operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOp {
    /// Allocate a detached node for `element` of the given native kind.
    CreateInstance {
        instance: InstanceId,
        element: Value,
        tag_name: Value,
    },
    /// Attach an existing instance directly under the top of the visible tree.
    CreateRoot { instance: InstanceId },
    /// Attach `child` under `parent`, ordered among its siblings by `sort`.
    AttachChild {
        parent: InstanceId,
        child: InstanceId,
        sort: Option<Value>,
    },
    AddAttribute {
        instance: InstanceId,
        attribute: Arc<str>,
        value: Value,
    },
    RemoveAttribute {
        instance: InstanceId,
        attribute: Arc<str>,
        value: Value,
    },
    /// The lifecycle manager reclaimed the instance.
    DestroyInstance { instance: InstanceId },
}

impl RenderOp {
    pub fn create_instance(
        instance: impl Into<InstanceId>,
        element: impl Into<Value>,
        tag_name: &str,
    ) -> Self {
        RenderOp::CreateInstance {
            instance: instance.into(),
            element: element.into(),
            tag_name: Value::from(tag_name),
        }
    }

    pub fn create_root(instance: impl Into<InstanceId>) -> Self {
        RenderOp::CreateRoot {
            instance: instance.into(),
        }
    }

    pub fn attach_child(
        parent: impl Into<InstanceId>,
        child: impl Into<InstanceId>,
        sort: Option<Value>,
    ) -> Self {
        RenderOp::AttachChild {
            parent: parent.into(),
            child: child.into(),
            sort,
        }
    }

    pub fn add_attribute(
        instance: impl Into<InstanceId>,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Self {
        RenderOp::AddAttribute {
            instance: instance.into(),
            attribute: Arc::from(attribute),
            value: value.into(),
        }
    }

    pub fn remove_attribute(
        instance: impl Into<InstanceId>,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Self {
        RenderOp::RemoveAttribute {
            instance: instance.into(),
            attribute: Arc::from(attribute),
            value: value.into(),
        }
    }

    pub fn destroy_instance(instance: impl Into<InstanceId>) -> Self {
        RenderOp::DestroyInstance {
            instance: instance.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Root creation targeted an instance that was never allocated.
    #[error("orphaned instance '{0}'")]
    OrphanedInstance(InstanceId),
}

/// Borrowed state a render operation mutates.
pub struct RenderCtx<'a, S: HostSurface + ?Sized> {
    pub surface: &'a mut S,
    pub directory: &'a mut InstanceDirectory,
    pub deferred: &'a mut DeferredQueue,
    pub pending: &'a PendingInputs,
}

pub struct RenderAdapter {
    names: TagNames,
    interner: Box<dyn Interner>,
}

impl std::fmt::Debug for RenderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderAdapter")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl RenderAdapter {
    pub fn new(names: TagNames, interner: Box<dyn Interner>) -> Self {
        Self { names, interner }
    }

    pub fn set_interner(&mut self, interner: Box<dyn Interner>) {
        self.interner = interner;
    }

    pub fn apply<S: HostSurface + ?Sized>(
        &self,
        ctx: &mut RenderCtx<'_, S>,
        ops: &[RenderOp],
    ) -> Result<(), RenderError> {
        validate(ctx.directory, ops)?;
        for op in ops {
            self.apply_one(ctx, op)?;
        }
        Ok(())
    }

    fn apply_one<S: HostSurface + ?Sized>(
        &self,
        ctx: &mut RenderCtx<'_, S>,
        op: &RenderOp,
    ) -> Result<(), RenderError> {
        log::trace!(target: "bridge.render", "apply {op:?}");
        match op {
            RenderOp::CreateInstance {
                instance,
                element,
                tag_name,
            } => {
                self.create_instance(ctx, instance, element, tag_name);
            }
            RenderOp::CreateRoot { instance } => {
                self.create_root(ctx, instance)?;
            }
            RenderOp::AttachChild {
                parent,
                child,
                sort,
            } => self.attach_child(ctx, parent, child, sort.as_ref()),
            RenderOp::AddAttribute {
                instance,
                attribute,
                value,
            } => self.add_attribute(ctx, instance, attribute, value),
            RenderOp::RemoveAttribute {
                instance,
                attribute,
                value,
            } => self.remove_attribute(ctx, instance, attribute, value),
            RenderOp::DestroyInstance { instance } => self.destroy_instance(ctx, instance),
        }
        Ok(())
    }

    /// Allocates a detached node and marks it with its instance and element ids.
    pub fn create_instance<S: HostSurface + ?Sized>(
        &self,
        ctx: &mut RenderCtx<'_, S>,
        instance: &InstanceId,
        element: &Value,
        tag_name: &Value,
    ) -> NodeKey {
        let tag_name = maybe_intern(tag_name, &*self.interner);
        let node = ctx.surface.create_element(&tag_name);
        ctx.surface.set_attribute(
            node,
            "instance",
            &maybe_intern(instance.value(), &*self.interner),
        );
        ctx.surface
            .set_attribute(node, "element", &maybe_intern(element, &*self.interner));
        let replaced = ctx
            .directory
            .insert(instance.clone(), InstanceRecord::new(node, element.clone()));
        if let Some(old) = replaced {
            log::warn!(target: "bridge.render", "instance {instance} created twice; dropping old node");
            ctx.surface.remove_node(old.node);
        }
        node
    }

    pub fn create_root<S: HostSurface + ?Sized>(
        &self,
        ctx: &mut RenderCtx<'_, S>,
        instance: &InstanceId,
    ) -> Result<NodeKey, RenderError> {
        let Some(node) = ctx.directory.node_of(instance) else {
            log::error!(target: "bridge.render", "orphaned instance '{instance}'");
            return Err(RenderError::OrphanedInstance(instance.clone()));
        };
        ctx.surface.append_root(node);
        Ok(node)
    }

    pub fn attach_child<S: HostSurface + ?Sized>(
        &self,
        ctx: &mut RenderCtx<'_, S>,
        parent: &InstanceId,
        child: &InstanceId,
        sort: Option<&Value>,
    ) {
        let (Some(parent_node), Some(record)) =
            (ctx.directory.node_of(parent), ctx.directory.get_mut(child))
        else {
            log::debug!(target: "bridge.render", "attach {child} under {parent}: instance gone");
            return;
        };
        record.sort = sort.cloned();
        let child_node = record.node;

        let before = sort.and_then(|sort| {
            ctx.surface
                .children(parent_node)
                .into_iter()
                .filter(|&sibling| sibling != child_node)
                .find(|&sibling| {
                    ctx.directory
                        .instance_at(sibling)
                        .and_then(|(_, r)| r.sort.as_ref())
                        .is_some_and(|s| s.sort_cmp(sort).is_gt())
                })
        });
        match before {
            Some(before) => ctx.surface.insert_before(parent_node, child_node, before),
            None => ctx.surface.append_child(parent_node, child_node),
        }
    }

    pub fn add_attribute<S: HostSurface + ?Sized>(
        &self,
        ctx: &mut RenderCtx<'_, S>,
        instance: &InstanceId,
        attribute: &str,
        value: &Value,
    ) {
        let Some(record) = ctx.directory.get_mut(instance) else {
            log::debug!(target: "bridge.render", "add {attribute} on unknown instance {instance}");
            return;
        };
        let node = record.node;
        let text = maybe_intern(value, &*self.interner);

        match attribute {
            "value" if ctx.surface.value(node).is_some() => {
                if ctx.pending.was_sent(&record.element, &text) {
                    log::trace!(target: "bridge.render", "value on {instance} echoes a sent change");
                }
                ctx.surface.set_value(node, &text);
                self.autosize_if_flagged(&mut *ctx.surface, node);
            }
            "tag" if ctx.surface.is_text_input(node) && *text == self.names.autosize_input => {
                ctx.deferred.push(Deferred::Autosize(instance.clone()));
            }
            "tag" if ctx.surface.is_text_input(node) && *text == self.names.trigger_focus => {
                ctx.deferred.push(Deferred::Focus(instance.clone()));
            }
            "class" => ctx.surface.add_class(node, &text),
            "style" => {
                record.styles.push(value.clone());
                ctx.surface.set_attribute(node, attribute, &text);
            }
            _ => {
                // Multi-valued tags overwrite each other in the literal attribute.
                if attribute != "tag" && ctx.surface.attribute(node, attribute).is_some() {
                    log::warn!(
                        target: "bridge.render",
                        "attribute {attribute} on {instance} written twice without removal"
                    );
                }
                ctx.surface.set_attribute(node, attribute, &text);
            }
        }
    }

    pub fn remove_attribute<S: HostSurface + ?Sized>(
        &self,
        ctx: &mut RenderCtx<'_, S>,
        instance: &InstanceId,
        attribute: &str,
        value: &Value,
    ) {
        let Some(record) = ctx.directory.get_mut(instance) else {
            log::debug!(target: "bridge.render", "remove {attribute} on unknown instance {instance}");
            return;
        };
        let node = record.node;
        let text = maybe_intern(value, &*self.interner);

        match attribute {
            "class" => ctx.surface.remove_class(node, &text),
            "style" => {
                if let Some(pos) = record.styles.iter().position(|s| s == value) {
                    record.styles.remove(pos);
                }
                // The literal always mirrors the most recent remaining ref.
                match record.styles.last() {
                    Some(last) => {
                        let last = maybe_intern(last, &*self.interner);
                        ctx.surface.set_attribute(node, attribute, &last);
                    }
                    None => ctx.surface.remove_attribute(node, attribute),
                }
            }
            "value" => {
                ctx.surface.remove_attribute(node, attribute);
                // Leave content alone if a newer value already replaced it.
                if ctx.surface.value(node).as_deref() == Some(&*text) {
                    ctx.surface.set_value(node, "");
                    self.autosize_if_flagged(&mut *ctx.surface, node);
                }
            }
            _ => ctx.surface.remove_attribute(node, attribute),
        }
    }

    /// Detaches the node and drops every side-table field of the instance.
    pub fn destroy_instance<S: HostSurface + ?Sized>(
        &self,
        ctx: &mut RenderCtx<'_, S>,
        instance: &InstanceId,
    ) {
        match ctx.directory.remove(instance) {
            Some(record) => ctx.surface.remove_node(record.node),
            None => log::debug!(target: "bridge.render", "destroy of unknown instance {instance}"),
        }
    }

    /// Runs one deferred task; the instance is resolved again at this point.
    pub fn run_deferred<S: HostSurface + ?Sized>(
        &self,
        surface: &mut S,
        directory: &InstanceDirectory,
        task: &Deferred,
    ) {
        let (Deferred::Autosize(instance) | Deferred::Focus(instance)) = task;
        let Some(node) = directory.node_of(instance) else {
            log::debug!(target: "bridge.render", "deferred {task:?}: instance gone");
            return;
        };
        match task {
            Deferred::Autosize(_) => {
                if surface.is_text_input(node) {
                    set_size_from_content(surface, node);
                }
            }
            Deferred::Focus(_) => surface.focus(node),
        }
    }

    fn autosize_if_flagged<S: HostSurface + ?Sized>(&self, surface: &mut S, node: NodeKey) {
        if surface.is_text_input(node) && surface.has_class(node, &self.names.autosize_class) {
            set_size_from_content(surface, node);
        }
    }
}

/// Width hint from content length in characters, never below 1.
pub(crate) fn set_size_from_content<S: HostSurface + ?Sized>(surface: &mut S, node: NodeKey) {
    let len = surface.value(node).map_or(0, |v| v.chars().count());
    surface.set_size(node, len.max(1));
}

fn validate(directory: &InstanceDirectory, ops: &[RenderOp]) -> Result<(), RenderError> {
    let mut created: HashSet<&InstanceId> = HashSet::new();
    let mut destroyed: HashSet<&InstanceId> = HashSet::new();
    for op in ops {
        match op {
            RenderOp::CreateInstance { instance, .. } => {
                created.insert(instance);
                destroyed.remove(instance);
            }
            RenderOp::DestroyInstance { instance } => {
                created.remove(instance);
                destroyed.insert(instance);
            }
            RenderOp::CreateRoot { instance } => {
                let live = created.contains(instance)
                    || (directory.contains(instance) && !destroyed.contains(instance));
                if !live {
                    log::error!(target: "bridge.render", "orphaned instance '{instance}'");
                    return Err(RenderError::OrphanedInstance(instance.clone()));
                }
            }
            _ => {}
        }
    }
    Ok(())
}
