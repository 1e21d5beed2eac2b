// In: src/class/accessor.rs

//! Stage 4 of the class pipeline: the accessor relocator.
//!
//! User methods never live on the produced arrays. Each class relocates them
//! into an `AccessorDescriptor` (an ordered method table) and registers that
//! table with an `AccessorRegistry`:
//!
//! - always under a generated private name, so the class's own methods are
//!   reachable even without a public name;
//! - additionally under the class's public accessor name, if it has one.
//!   Several classes may share a public name; lookups scan them
//!   most-recently-registered first.
//!
//! An `Accessor` binds one array to the tables registered under one name.

use crate::error::ArrayClassError;
use crate::labeled::LabeledArray;
use crate::types::Scalar;
use crate::utils::{is_dunder, is_identifier, private_accessor_name, PRIVATE_ACCESSOR_PREFIX};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

//==================================================================================
// I. Methods and Values
//==================================================================================

/// What a user method returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Array(LabeledArray),
    Scalar(Scalar),
}

impl Value {
    pub fn into_array(self) -> Result<LabeledArray, ArrayClassError> {
        match self {
            Value::Array(array) => Ok(array),
            Value::Scalar(scalar) => Err(ArrayClassError::InvalidOperation(format!(
                "expected an array result, got scalar {}",
                scalar
            ))),
        }
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Scalar(scalar) => Some(*scalar),
            Value::Array(_) => None,
        }
    }
}

impl From<LabeledArray> for Value {
    fn from(array: LabeledArray) -> Self {
        Value::Array(array)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(Scalar::Float(value))
    }
}

/// A user-defined method. It receives the accessor bound to the array it was
/// invoked on, so it can read the array (through `Deref`) and call sibling
/// methods (through `Accessor::call`).
pub type Method =
    Arc<dyn Fn(&Accessor<'_>, &[Scalar]) -> Result<Value, ArrayClassError> + Send + Sync>;

//==================================================================================
// II. Accessor Descriptor (the relocated method table)
//==================================================================================

#[derive(Clone)]
pub struct AccessorDescriptor {
    class_name: String,
    methods: Vec<(String, Method)>,
}

impl AccessorDescriptor {
    /// Layers `own` methods over `inherited` ones. A redefinition replaces the
    /// inherited method in place.
    pub(crate) fn relocate(
        class_name: &str,
        inherited: Option<&AccessorDescriptor>,
        own: Vec<(String, Method)>,
    ) -> Result<Self, ArrayClassError> {
        let mut methods: Vec<(String, Method)> =
            inherited.map(|base| base.methods.clone()).unwrap_or_default();

        for (name, method) in own {
            if is_dunder(&name) || !is_identifier(&name) {
                return Err(ArrayClassError::InvalidDeclaration(format!(
                    "'{}' is not a valid method name for class '{}'",
                    name, class_name
                )));
            }
            match methods.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = method,
                None => methods.push((name, method)),
            }
        }

        Ok(Self {
            class_name: class_name.to_string(),
            methods,
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, method)| method)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for AccessorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorDescriptor")
            .field("class_name", &self.class_name)
            .field("methods", &self.method_names().collect::<Vec<_>>())
            .finish()
    }
}

//==================================================================================
// III. Registry
//==================================================================================

enum Binding {
    /// Public name shared by one or more classes, most recent first.
    Shared(Vec<Arc<AccessorDescriptor>>),
    /// Generated per-class name.
    Private(Arc<AccessorDescriptor>),
    /// Claimed by something that is not an array class.
    Foreign(String),
}

/// Maps accessor names to the method tables registered under them.
///
/// Create one at startup, share it via `Arc`, and build every class against
/// it. Registration only happens while classes are built; afterwards the
/// registry is only read.
#[derive(Default)]
pub struct AccessorRegistry {
    bindings: RwLock<HashMap<String, Binding>>,
}

impl AccessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `descriptor` in front of the classes already sharing `name`.
    pub fn register(
        &self,
        name: &str,
        descriptor: Arc<AccessorDescriptor>,
    ) -> Result<(), ArrayClassError> {
        if !is_identifier(name) || is_dunder(name) || name.starts_with(PRIVATE_ACCESSOR_PREFIX) {
            return Err(ArrayClassError::AccessorConflict {
                name: name.to_string(),
                reason: "not a usable accessor name".to_string(),
            });
        }

        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        match bindings.get_mut(name) {
            Some(Binding::Shared(owners)) => {
                owners.insert(0, descriptor);
            }
            Some(Binding::Foreign(owner)) => {
                return Err(ArrayClassError::AccessorConflict {
                    name: name.to_string(),
                    reason: format!("already bound to {}", owner),
                });
            }
            Some(Binding::Private(_)) => {
                return Err(ArrayClassError::AccessorConflict {
                    name: name.to_string(),
                    reason: "already bound to a private accessor".to_string(),
                });
            }
            None => {
                bindings.insert(name.to_string(), Binding::Shared(vec![descriptor]));
            }
        }
        Ok(())
    }

    /// Registers `descriptor` under a fresh generated name and returns it.
    pub fn register_private(&self, descriptor: Arc<AccessorDescriptor>) -> String {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        loop {
            let name = private_accessor_name();
            if !bindings.contains_key(&name) {
                bindings.insert(name.clone(), Binding::Private(descriptor));
                return name;
            }
        }
    }

    /// Claims `name` for a namespace that is not an array class, so no class
    /// can register under it.
    pub fn reserve(&self, name: &str, owner: &str) -> Result<(), ArrayClassError> {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        if bindings.contains_key(name) {
            return Err(ArrayClassError::AccessorConflict {
                name: name.to_string(),
                reason: "already registered".to_string(),
            });
        }
        bindings.insert(name.to_string(), Binding::Foreign(owner.to_string()));
        Ok(())
    }

    /// Method tables registered under `name`, in lookup order. Empty when
    /// nothing (or something foreign) is registered there.
    pub fn resolve(&self, name: &str) -> Vec<Arc<AccessorDescriptor>> {
        let bindings = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        match bindings.get(name) {
            Some(Binding::Shared(owners)) => owners.clone(),
            Some(Binding::Private(owner)) => vec![Arc::clone(owner)],
            Some(Binding::Foreign(_)) | None => Vec::new(),
        }
    }

    /// Binds `array` to the accessor registered under `name`.
    pub fn accessor<'a>(
        &self,
        name: &str,
        array: &'a LabeledArray,
    ) -> Result<Accessor<'a>, ArrayClassError> {
        let owners = self.resolve(name);
        if owners.is_empty() {
            return Err(ArrayClassError::InvalidOperation(format!(
                "no array-class accessor is registered under '{}'",
                name
            )));
        }
        Ok(Accessor {
            name: name.to_string(),
            array,
            owners,
        })
    }

    /// Public accessor names, sorted.
    pub fn names(&self) -> Vec<String> {
        let bindings = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = bindings
            .iter()
            .filter(|(_, binding)| matches!(binding, Binding::Shared(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl fmt::Debug for AccessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

//==================================================================================
// IV. Accessor (one array bound to one name)
//==================================================================================

/// Namespace of user methods bound to one array.
///
/// Dereferences to the array itself, so inside a method `acc.max()` reaches
/// the array's own members while `acc.call("normalize", &[])` reaches
/// relocated methods.
#[derive(Clone)]
pub struct Accessor<'a> {
    name: String,
    array: &'a LabeledArray,
    owners: Vec<Arc<AccessorDescriptor>>,
}

impl<'a> Accessor<'a> {
    /// The name this accessor was looked up under. Named so it does not
    /// shadow `LabeledArray::name` through `Deref`.
    pub fn accessor_name(&self) -> &str {
        &self.name
    }

    pub fn array(&self) -> &'a LabeledArray {
        self.array
    }

    /// Invokes the first method called `method` among the owning classes.
    pub fn call(&self, method: &str, args: &[Scalar]) -> Result<Value, ArrayClassError> {
        let found = self
            .owners
            .iter()
            .find_map(|owner| owner.method(method))
            .ok_or_else(|| ArrayClassError::NoSuchAttribute {
                accessor: self.name.clone(),
                name: method.to_string(),
            })?;
        log::debug!(
            "Accessor '{}' dispatching '{}' on array of shape {:?}",
            self.name,
            method,
            self.array.shape()
        );
        (**found)(self, args)
    }

    pub fn has(&self, method: &str) -> bool {
        self.owners.iter().any(|owner| owner.method(method).is_some())
    }

    /// Union of all owning classes' method names.
    pub fn members(&self) -> BTreeSet<String> {
        self.owners
            .iter()
            .flat_map(|owner| owner.method_names().map(str::to_string))
            .collect()
    }

    /// Names of the owning classes, in lookup order.
    pub fn owners(&self) -> Vec<&str> {
        self.owners.iter().map(|owner| owner.class_name()).collect()
    }

    /// The same namespace bound to another array, e.g. one a method returned.
    pub fn rebind<'b>(&self, array: &'b LabeledArray) -> Accessor<'b> {
        Accessor {
            name: self.name.clone(),
            array,
            owners: self.owners.clone(),
        }
    }
}

impl Deref for Accessor<'_> {
    type Target = LabeledArray;

    fn deref(&self) -> &LabeledArray {
        self.array
    }
}

impl fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("name", &self.name)
            .field("owners", &self.owners())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeled::Attrs;
    use crate::types::ArrayData;

    fn method<F>(f: F) -> Method
    where
        F: Fn(&Accessor<'_>, &[Scalar]) -> Result<Value, ArrayClassError> + Send + Sync + 'static,
    {
        Arc::new(f)
    }

    fn constant(value: f64) -> Method {
        method(move |_, _| Ok(Value::from(value)))
    }

    fn sample() -> LabeledArray {
        LabeledArray::new(
            ArrayData::from(vec![1.0, 2.0, 4.0]),
            vec!["x".to_string()],
            None,
            Attrs::new(),
        )
        .unwrap()
    }

    fn descriptor(class: &str, methods: Vec<(&str, Method)>) -> Arc<AccessorDescriptor> {
        let own = methods.into_iter().map(|(n, m)| (n.to_string(), m)).collect();
        Arc::new(AccessorDescriptor::relocate(class, None, own).unwrap())
    }

    #[test]
    fn test_relocate_rejects_reserved_names() {
        let own = vec![("__init__".to_string(), constant(0.0))];
        assert!(AccessorDescriptor::relocate("Image", None, own).is_err());

        let own = vec![("not-a-name".to_string(), constant(0.0))];
        assert!(AccessorDescriptor::relocate("Image", None, own).is_err());
    }

    #[test]
    fn test_relocate_overrides_inherited_in_place() {
        let base = descriptor("Base", vec![("a", constant(1.0)), ("b", constant(2.0))]);
        let sub = AccessorDescriptor::relocate(
            "Sub",
            Some(&base),
            vec![("a".to_string(), constant(10.0)), ("c".to_string(), constant(3.0))],
        )
        .unwrap();

        assert_eq!(sub.method_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let array = sample();
        let registry = AccessorRegistry::new();
        let name = registry.register_private(Arc::new(sub));
        let accessor = registry.accessor(&name, &array).unwrap();
        assert_eq!(accessor.call("a", &[]).unwrap(), Value::from(10.0));
    }

    #[test]
    fn test_shared_name_most_recent_wins() {
        let registry = AccessorRegistry::new();
        registry
            .register("img", descriptor("Image", vec![("scale", constant(1.0)), ("only_image", constant(5.0))]))
            .unwrap();
        registry
            .register("img", descriptor("Weighted", vec![("scale", constant(2.0))]))
            .unwrap();

        let array = sample();
        let accessor = registry.accessor("img", &array).unwrap();

        assert_eq!(accessor.owners(), vec!["Weighted", "Image"]);
        assert_eq!(accessor.call("scale", &[]).unwrap(), Value::from(2.0));
        assert_eq!(accessor.call("only_image", &[]).unwrap(), Value::from(5.0));

        let members: Vec<String> = accessor.members().into_iter().collect();
        assert_eq!(members, vec!["only_image", "scale"]);
    }

    #[test]
    fn test_missing_method_is_no_such_attribute() {
        let registry = AccessorRegistry::new();
        registry.register("img", descriptor("Image", vec![])).unwrap();

        let array = sample();
        let err = registry.accessor("img", &array).unwrap().call("nope", &[]).unwrap_err();
        match err {
            ArrayClassError::NoSuchAttribute { accessor, name } => {
                assert_eq!(accessor, "img");
                assert_eq!(name, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conflicts() {
        let registry = AccessorRegistry::new();
        registry.reserve("plot", "plotting namespace").unwrap();

        assert!(matches!(
            registry.register("plot", descriptor("Image", vec![])),
            Err(ArrayClassError::AccessorConflict { .. })
        ));
        assert!(registry.register("bad name", descriptor("Image", vec![])).is_err());
        assert!(registry.register("_accessor_00", descriptor("Image", vec![])).is_err());
        assert!(registry.reserve("plot", "again").is_err());

        let array = sample();
        assert!(registry.accessor("plot", &array).is_err());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_methods_call_siblings_through_the_accessor() {
        let registry = AccessorRegistry::new();
        let peak = method(|acc, _| Ok(Value::from(acc.max()?)));
        let normalize = method(|acc, _| {
            let peak = acc.call("peak", &[])?.as_scalar().map(|s| s.as_f64()).unwrap_or(1.0);
            Ok(Value::from(acc.divide(peak)?))
        });
        registry
            .register("sig", descriptor("Signal", vec![("peak", peak), ("normalize", normalize)]))
            .unwrap();

        let array = sample();
        let accessor = registry.accessor("sig", &array).unwrap();
        let normalized = accessor.call("normalize", &[]).unwrap().into_array().unwrap();

        assert_eq!(normalized.data(), &ArrayData::from(vec![0.25, 0.5, 1.0]));
        let again = accessor.rebind(&normalized);
        assert_eq!(again.call("peak", &[]).unwrap(), Value::from(1.0));
    }

    #[test]
    fn test_deref_reaches_the_array_name() {
        let registry = AccessorRegistry::new();
        let label = method(|acc, _| {
            let named = acc.name() == Some("arr") && acc.accessor_name() == "nm";
            Ok(Value::from(Scalar::from(named)))
        });
        registry.register("nm", descriptor("Named", vec![("label", label)])).unwrap();

        let array = LabeledArray::new(
            ArrayData::from(vec![1.0]),
            vec!["x".to_string()],
            Some("arr".to_string()),
            Attrs::new(),
        )
        .unwrap();
        let accessor = registry.accessor("nm", &array).unwrap();

        assert_eq!(accessor.name(), Some("arr"));
        assert_eq!(accessor.accessor_name(), "nm");
        assert_eq!(accessor.call("label", &[]).unwrap(), Value::from(Scalar::Bool(true)));
    }
}
