use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{MarshalError, Result};
use crate::marshallable::{Marshallable, Unmarshallable};
use crate::reader::UnmarshallingContext;
use crate::writer::MarshallingContext;

/// Writes one value of `T` through a marshalling context.
pub type MarshalFn<T> = fn(&T, &mut MarshallingContext<'_>) -> Result<()>;

/// Reads one value of `T` from an unmarshalling context.
pub type UnmarshalFn<T> = fn(&mut UnmarshallingContext<'_>) -> Result<T>;

#[derive(Clone)]
struct Entry {
    type_name: &'static str,
    function: Arc<dyn Any + Send + Sync>,
}

#[derive(Clone, Default)]
struct Entries(HashMap<TypeId, Entry>);

impl Entries {
    fn insert<T: ?Sized + 'static>(&mut self, function: Arc<dyn Any + Send + Sync>) -> bool {
        let entry = Entry {
            type_name: type_name::<T>(),
            function,
        };
        self.0.insert(TypeId::of::<T>(), entry).is_some()
    }

    fn get<F: Copy + 'static>(&self, type_id: TypeId) -> Option<F> {
        self.0
            .get(&type_id)
            .and_then(|entry| entry.function.downcast_ref::<F>())
            .copied()
    }

    fn contains(&self, type_id: TypeId) -> bool {
        self.0.contains_key(&type_id)
    }

    fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.0.values().map(|entry| entry.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Entries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}

/// Type-keyed registry of object marshallers.
///
/// Built before the marshalling context and handed to it at construction;
/// the context never mutates it. Cloning is cheap.
#[derive(Clone, Debug, Default)]
pub struct ObjectMarshallers {
    entries: Entries,
}

impl ObjectMarshallers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the marshaller for `T`, replacing any previous one.
    pub fn register<T: ?Sized + 'static>(&mut self, marshal: MarshalFn<T>) -> &mut Self {
        let replaced = self.entries.insert::<T>(Arc::new(marshal));
        if replaced {
            debug!(type_name = type_name::<T>(), "replaced object marshaller");
        } else {
            debug!(type_name = type_name::<T>(), "registered object marshaller");
        }
        self
    }

    /// Register `T`'s own [`Marshallable`] implementation.
    pub fn register_marshallable<T: Marshallable + 'static>(&mut self) -> &mut Self {
        self.register::<T>(marshal_with::<T>)
    }

    /// Marshaller registered for `T`.
    pub fn get<T: ?Sized + 'static>(&self) -> Result<MarshalFn<T>> {
        self.entries
            .get::<MarshalFn<T>>(TypeId::of::<T>())
            .ok_or(MarshalError::MissingMarshaller(type_name::<T>()))
    }

    /// Check if a marshaller is registered for `T`.
    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        self.entries.contains(TypeId::of::<T>())
    }

    /// Names of the registered types, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.type_names()
    }

    pub fn len(&self) -> usize {
        self.entries.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.0.is_empty()
    }
}

/// Type-keyed registry of object unmarshallers.
#[derive(Clone, Debug, Default)]
pub struct ObjectUnmarshallers {
    entries: Entries,
}

impl ObjectUnmarshallers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the unmarshaller for `T`, replacing any previous one.
    pub fn register<T: 'static>(&mut self, unmarshal: UnmarshalFn<T>) -> &mut Self {
        let replaced = self.entries.insert::<T>(Arc::new(unmarshal));
        if replaced {
            debug!(type_name = type_name::<T>(), "replaced object unmarshaller");
        } else {
            debug!(type_name = type_name::<T>(), "registered object unmarshaller");
        }
        self
    }

    /// Register `T`'s own [`Unmarshallable`] implementation.
    pub fn register_unmarshallable<T: Unmarshallable + 'static>(&mut self) -> &mut Self {
        self.register::<T>(T::unmarshal_from)
    }

    /// Unmarshaller registered for `T`.
    pub fn get<T: 'static>(&self) -> Result<UnmarshalFn<T>> {
        self.entries
            .get::<UnmarshalFn<T>>(TypeId::of::<T>())
            .ok_or(MarshalError::MissingUnmarshaller(type_name::<T>()))
    }

    /// Check if an unmarshaller is registered for `T`.
    pub fn has<T: 'static>(&self) -> bool {
        self.entries.contains(TypeId::of::<T>())
    }

    /// Names of the registered types, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.type_names()
    }

    pub fn len(&self) -> usize {
        self.entries.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.0.is_empty()
    }
}

fn marshal_with<T: Marshallable>(value: &T, context: &mut MarshallingContext<'_>) -> Result<()> {
    value.marshal_into(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    fn write_point(point: &Point, context: &mut MarshallingContext<'_>) -> Result<()> {
        context.write_compact_int(point.x)?;
        context.write_compact_int(point.y)
    }

    fn read_point(context: &mut UnmarshallingContext<'_>) -> Result<Point> {
        Ok(Point {
            x: context.read_compact_int()?,
            y: context.read_compact_int()?,
        })
    }

    #[test]
    fn register_and_lookup_marshaller() {
        let mut registry = ObjectMarshallers::new();
        assert!(registry.is_empty());

        registry.register::<Point>(write_point);

        assert!(registry.has::<Point>());
        assert!(!registry.has::<String>());
        assert_eq!(registry.len(), 1);
        assert!(registry.get::<Point>().is_ok());
    }

    #[test]
    fn missing_marshaller_names_the_type() {
        let registry = ObjectMarshallers::new();
        let err = registry.get::<Point>().unwrap_err();

        assert!(matches!(err, MarshalError::MissingMarshaller(name) if name.ends_with("Point")));
    }

    #[test]
    fn missing_unmarshaller_names_the_type() {
        let registry = ObjectUnmarshallers::new();
        let err = registry.get::<Point>().unwrap_err();

        assert!(matches!(err, MarshalError::MissingUnmarshaller(name) if name.ends_with("Point")));
    }

    #[test]
    fn one_entry_per_type() {
        let mut registry = ObjectUnmarshallers::new();
        registry.register::<Point>(read_point);
        registry.register::<Point>(|_| Ok(Point { x: 0, y: 0 }));

        assert_eq!(registry.len(), 1);
        let read = registry.get::<Point>().unwrap();
        let mut context = UnmarshallingContext::new(&b""[..]);
        assert_eq!(read(&mut context).unwrap(), Point { x: 0, y: 0 });
    }

    #[test]
    fn type_names_are_sorted() {
        let mut registry = ObjectMarshallers::new();
        registry
            .register::<Point>(write_point)
            .register::<str>(|s, context| context.write_string_shared(s));

        let names = registry.type_names();
        assert_eq!(names.len(), 2);
        assert!(names.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn dispatch_through_contexts() {
        let mut marshallers = ObjectMarshallers::new();
        marshallers.register::<Point>(write_point);
        let mut unmarshallers = ObjectUnmarshallers::new();
        unmarshallers.register::<Point>(read_point);

        let mut wire = Vec::new();
        let mut writer =
            MarshallingContext::with_marshallers(&mut wire, marshallers, Default::default());
        writer.write_object(&Point { x: 3, y: -4 }).unwrap();
        writer.close().unwrap();

        assert_eq!(wire, vec![3, 0xFE, 0xFF, 0xFC]);

        let mut reader = UnmarshallingContext::with_unmarshallers(
            wire.as_slice(),
            unmarshallers,
            Default::default(),
        );
        assert_eq!(reader.read_object::<Point>().unwrap(), Point { x: 3, y: -4 });
    }

    #[test]
    fn cloned_registries_share_entries() {
        let mut registry = ObjectMarshallers::new();
        registry.register::<Point>(write_point);
        let cloned = registry.clone();

        assert!(cloned.has::<Point>());
        assert_eq!(format!("{cloned:?}"), format!("{registry:?}"));
    }
}
