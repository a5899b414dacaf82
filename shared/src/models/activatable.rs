//! Soft-delete support
//!
//! Entities that are deactivated instead of removed implement [`Activatable`].
//! Stores expose a single deactivation path keyed by [`Activatable::TABLE`].

pub trait Activatable {
    /// Storage table (and resource name in logs)
    const TABLE: &'static str;

    fn id(&self) -> i64;
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool, now: i64);
}

/// Implement [`Activatable`] for a model with `id`, `active` and `updated_at` fields.
macro_rules! impl_activatable {
    ($ty:ty, $table:literal) => {
        impl $crate::models::Activatable for $ty {
            const TABLE: &'static str = $table;

            fn id(&self) -> i64 {
                self.id
            }

            fn is_active(&self) -> bool {
                self.active
            }

            fn set_active(&mut self, active: bool, now: i64) {
                self.active = active;
                self.updated_at = now;
            }
        }
    };
}

pub(crate) use impl_activatable;
