//! Binding key types for the resolution engine.

use std::any::TypeId;

/// Key for binding storage and lookup.
///
/// Keys uniquely identify bindings in the container. Concrete types are
/// keyed by `TypeId`, named registrations live in their own disjoint
/// namespace, and interfaces (trait objects) are keyed by trait name for
/// disambiguation through the interface index.
///
/// # Examples
///
/// ```rust
/// use bindery::{BindingSet, Resolver};
///
/// let mut bindings = BindingSet::new();
/// bindings.add_instance(8080u32);
/// bindings.add_named_instance("admin_port", 9090u32);
///
/// let container = bindings.build();
///
/// // Resolution uses keys internally
/// let port = container.get::<u32>().unwrap(); // Key::Type
/// let admin = container.get_named::<u32>("admin_port").unwrap(); // Key::TypeNamed
///
/// assert_eq!(*port, 8080);
/// assert_eq!(*admin, 9090);
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Concrete type key with TypeId and type name for diagnostics
    Type(TypeId, &'static str),
    /// Named concrete type key with TypeId, type name, and binding name
    ///
    /// Lives in a namespace disjoint from `Type`: the same type may carry
    /// one default binding and any number of named ones.
    TypeNamed(TypeId, &'static str, &'static str),
    /// Interface key carrying the trait name
    ///
    /// Used by the interface index for best-implementation selection.
    /// Traits have no `TypeId`, so only the name is stored.
    Interface(&'static str),
}

impl Key {
    /// Get the type or trait name for display.
    ///
    /// This is the `std::any::type_name` result, used in error paths and
    /// cycle reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::TypeNamed(_, name, _) => name,
            Key::Interface(name) => name,
        }
    }

    /// Get the binding name for named bindings, or None otherwise.
    pub fn binding_name(&self) -> Option<&'static str> {
        match self {
            Key::Type(_, _) | Key::Interface(_) => None,
            Key::TypeNamed(_, _, name) => Some(name),
        }
    }
}

// TypeId-only comparison for concrete types on the hot path; the stored
// type name is diagnostic only.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::TypeNamed(a, _, name_a), Key::TypeNamed(b, _, name_b)) => {
                a == b && name_a == name_b
            }
            (Key::Interface(a), Key::Interface(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::TypeNamed(id, _, name) => {
                1u8.hash(state);
                id.hash(state);
                name.hash(state);
            }
            Key::Interface(name) => {
                2u8.hash(state);
                name.hash(state);
            }
        }
    }
}

/// Key for a concrete type.
#[inline(always)]
pub fn key_of<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for a named binding of a concrete type.
#[inline(always)]
pub fn named_key_of<T: 'static>(name: &'static str) -> Key {
    Key::TypeNamed(TypeId::of::<T>(), std::any::type_name::<T>(), name)
}

/// Key for an interface (trait object).
#[inline(always)]
pub fn interface_key_of<T: ?Sized + 'static>() -> Key {
    Key::Interface(std::any::type_name::<T>())
}
