use crate::core::serialization::PayloadType;
use crate::error::constants::{ERR_BINDER_READ_LOCK, ERR_BINDER_WRITE_LOCK};
use crate::error::{ProtocolError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Resolves the concrete payload types a frame body needs.
///
/// Supplied by the dispatch host, which knows the hub's method signatures and
/// the calls currently in flight.
pub trait InvocationBinder: Send + Sync {
    /// Argument types of the hub method `target`, in declaration order
    fn parameter_types(&self, target: &str) -> Result<Vec<PayloadType>>;

    /// Type of stream items / the completion result for an in-flight call
    fn return_type(&self, invocation_id: &str) -> Result<PayloadType>;
}

impl<B: InvocationBinder + ?Sized> InvocationBinder for Arc<B> {
    fn parameter_types(&self, target: &str) -> Result<Vec<PayloadType>> {
        (**self).parameter_types(target)
    }

    fn return_type(&self, invocation_id: &str) -> Result<PayloadType> {
        (**self).return_type(invocation_id)
    }
}

/// Map-backed binder a host can populate as methods are declared and calls
/// are issued.
#[derive(Clone, Default)]
pub struct StaticBinder {
    targets: Arc<RwLock<HashMap<String, Vec<PayloadType>>>>,
    invocations: Arc<RwLock<HashMap<String, PayloadType>>>,
}

impl StaticBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the parameter types of a hub method
    pub fn bind_target(&self, target: &str, parameters: Vec<PayloadType>) -> Result<()> {
        let mut targets = self
            .targets
            .write()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_BINDER_WRITE_LOCK))?;

        targets.insert(target.to_string(), parameters);
        Ok(())
    }

    /// Record the result type of an outgoing call
    pub fn bind_invocation(&self, invocation_id: &str, return_type: PayloadType) -> Result<()> {
        let mut invocations = self
            .invocations
            .write()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_BINDER_WRITE_LOCK))?;

        invocations.insert(invocation_id.to_string(), return_type);
        Ok(())
    }

    /// Forget a finished call. Returns whether it was known.
    pub fn release_invocation(&self, invocation_id: &str) -> Result<bool> {
        let mut invocations = self
            .invocations
            .write()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_BINDER_WRITE_LOCK))?;

        Ok(invocations.remove(invocation_id).is_some())
    }

    /// Number of calls currently bound
    pub fn pending_invocations(&self) -> Result<usize> {
        let invocations = self
            .invocations
            .read()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_BINDER_READ_LOCK))?;
        Ok(invocations.len())
    }
}

impl InvocationBinder for StaticBinder {
    fn parameter_types(&self, target: &str) -> Result<Vec<PayloadType>> {
        let targets = self
            .targets
            .read()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_BINDER_READ_LOCK))?;

        targets
            .get(target)
            .cloned()
            .ok_or_else(|| ProtocolError::UnknownTarget(target.to_string()))
    }

    fn return_type(&self, invocation_id: &str) -> Result<PayloadType> {
        let invocations = self
            .invocations
            .read()
            .map_err(|_| ProtocolError::LockPoisoned(ERR_BINDER_READ_LOCK))?;

        invocations
            .get(invocation_id)
            .copied()
            .ok_or_else(|| ProtocolError::UnknownInvocation(invocation_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::core::geometry::Vector3;

    #[test]
    fn test_unknown_lookups_fail() {
        let binder = StaticBinder::new();
        assert!(matches!(
            binder.parameter_types("Missing"),
            Err(ProtocolError::UnknownTarget(t)) if t == "Missing"
        ));
        assert!(matches!(
            binder.return_type("42"),
            Err(ProtocolError::UnknownInvocation(id)) if id == "42"
        ));
    }

    #[test]
    fn test_invocation_lifecycle() {
        let binder = StaticBinder::new();
        binder
            .bind_invocation("7", PayloadType::of::<Vector3>())
            .unwrap();
        assert_eq!(binder.pending_invocations().unwrap(), 1);
        assert_eq!(
            binder.return_type("7").unwrap(),
            PayloadType::of::<Vector3>()
        );

        assert!(binder.release_invocation("7").unwrap());
        assert!(!binder.release_invocation("7").unwrap());
        assert_eq!(binder.pending_invocations().unwrap(), 0);
    }

    #[test]
    fn test_poisoned_lock_reported() {
        let binder = StaticBinder::new();
        let invocations = Arc::clone(&binder.invocations);
        let _ = std::thread::spawn(move || {
            let _guard = invocations.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(
            binder.pending_invocations(),
            Err(ProtocolError::LockPoisoned(ERR_BINDER_READ_LOCK))
        ));
    }

    #[test]
    fn test_clones_share_bindings() {
        let binder = StaticBinder::new();
        let shared = binder.clone();
        binder
            .bind_target("Move", vec![PayloadType::of::<Vector3>()])
            .unwrap();
        assert_eq!(shared.parameter_types("Move").unwrap().len(), 1);

        let via_arc: Arc<dyn InvocationBinder> = Arc::new(shared);
        assert!(via_arc.parameter_types("Move").is_ok());
    }
}
