//! # Component Store
//!
//! Per-context table of owned connected components. Readers share the lock;
//! a dispatch publishes its whole batch under one write lock, so no reader
//! ever sees a partially populated generation.

use crate::component::ConnectedComponent;
use crate::error::{Error, Result};
use crate::flags::ComponentTypeFlags;
use crate::handle::{ComponentHandle, HandleTable};
use parking_lot::RwLock;

/// How a published batch relates to the components already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// Drop every stored component first.
    Replace,
    /// Keep stored components next to the new ones.
    Accumulate,
}

/// Owner of a context's connected components.
#[derive(Debug, Default)]
pub struct ComponentStore {
    table: RwLock<HandleTable<ComponentHandle, ConnectedComponent>>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles of every component whose type is in `filter`, in creation
    /// order.
    pub fn list(&self, filter: ComponentTypeFlags) -> Vec<ComponentHandle> {
        self.table
            .read()
            .iter()
            .filter(|(_, c)| filter.bits() & c.component_type() as u32 != 0)
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Runs `f` on the component named by `handle` under the read lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if this store does not own `handle`.
    pub fn with_component<R>(
        &self,
        handle: ComponentHandle,
        f: impl FnOnce(&ConnectedComponent) -> R,
    ) -> Result<R> {
        let table = self.table.read();
        let component = table.get(handle).ok_or_else(|| {
            Error::invalid_handle(format!("component {handle} does not belong to this context"))
        })?;
        Ok(f(component))
    }

    /// Inserts a dispatch's components in one step.
    ///
    /// Returns the number of components dropped by [`Publish::Replace`].
    pub fn publish(
        &self,
        batch: Vec<(ComponentHandle, ConnectedComponent)>,
        mode: Publish,
    ) -> usize {
        let mut table = self.table.write();
        let dropped = match mode {
            Publish::Replace => table.drain().len(),
            Publish::Accumulate => 0,
        };
        for (handle, component) in batch {
            table.insert(handle, component);
        }
        dropped
    }

    /// Releases the named components, or every component when `handles` is
    /// empty. Returns the number released.
    ///
    /// Either every named component is released or none is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if any handle is not owned by this
    /// store.
    pub fn release(&self, handles: &[ComponentHandle]) -> Result<usize> {
        let mut table = self.table.write();
        if handles.is_empty() {
            return Ok(table.drain().len());
        }

        if let Some(unknown) = handles.iter().find(|&&h| !table.contains(h)) {
            return Err(Error::invalid_handle(format!(
                "component {unknown} does not belong to this context"
            )));
        }
        Ok(handles.iter().filter_map(|&h| table.remove(h)).count())
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array_mesh::ArrayMesh;
    use crate::error::ErrorKind;
    use meshcut_kernel::{MeshRole, Operand, PatchSide};

    fn patch() -> ConnectedComponent {
        ConnectedComponent::new(
            MeshRole::Patch {
                side: PatchSide::Inside,
            }
            .into(),
            ArrayMesh::default(),
        )
    }

    fn input() -> ConnectedComponent {
        ConnectedComponent::new(
            MeshRole::Input {
                operand: Operand::Cut,
            }
            .into(),
            ArrayMesh::default(),
        )
    }

    fn h(raw: u64) -> ComponentHandle {
        ComponentHandle::from_raw(raw)
    }

    #[test]
    fn test_list_filters_by_type() {
        let store = ComponentStore::new();
        store.publish(
            vec![(h(1), patch()), (h(2), input()), (h(3), patch())],
            Publish::Replace,
        );

        assert_eq!(store.list(ComponentTypeFlags::ALL), vec![h(1), h(2), h(3)]);
        assert_eq!(store.list(ComponentTypeFlags::PATCH), vec![h(1), h(3)]);
        assert_eq!(
            store.list(ComponentTypeFlags::INPUT | ComponentTypeFlags::SEAM),
            vec![h(2)]
        );
        assert!(store.list(ComponentTypeFlags::FRAGMENT).is_empty());
    }

    #[test]
    fn test_publish_replace_and_accumulate() {
        let store = ComponentStore::new();
        store.publish(vec![(h(1), patch())], Publish::Replace);

        assert_eq!(store.publish(vec![(h(2), patch())], Publish::Accumulate), 0);
        assert_eq!(store.len(), 2);

        assert_eq!(store.publish(vec![(h(3), input())], Publish::Replace), 2);
        assert_eq!(store.list(ComponentTypeFlags::ALL), vec![h(3)]);
    }

    #[test]
    fn test_release_is_all_or_nothing() {
        let store = ComponentStore::new();
        store.publish(vec![(h(1), patch()), (h(2), input())], Publish::Replace);

        let err = store.release(&[h(1), h(99)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
        assert_eq!(store.len(), 2);

        assert_eq!(store.release(&[h(1)]).unwrap(), 1);
        assert_eq!(store.list(ComponentTypeFlags::ALL), vec![h(2)]);
    }

    #[test]
    fn test_release_empty_set_releases_all() {
        let store = ComponentStore::new();
        store.publish(vec![(h(1), patch()), (h(2), input())], Publish::Replace);

        assert_eq!(store.release(&[]).unwrap(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_with_component_unknown_handle() {
        let store = ComponentStore::new();
        let err = store.with_component(h(5), |_| ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
    }
}
