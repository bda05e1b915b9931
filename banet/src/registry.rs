//! # Object Registry
//!
//! Builds objects from specs: a [`ConfigDict`] whose `type` field names what to
//! construct and whose remaining fields are the constructor arguments.
//!
//! Type names resolve against an explicit [`Registry`] filled in at startup, or
//! against a caller-supplied parent [`Factory`], never against arbitrary code.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{ConfigDict, ConfigValue};
use crate::error::{BANetError, BANetResult};

/// Reserved spec field holding the type name.
pub const TYPE_KEY: &str = "type";

/// A constructor taking the spec's arguments.
pub type Constructor<T> = Box<dyn Fn(ConfigDict) -> BANetResult<T> + Send + Sync>;

/// Something that can construct a `T` from a type name and its arguments.
pub trait Factory<T> {
    /// Construct the object named `name` from `args`.
    fn construct(&self, name: &str, args: ConfigDict) -> BANetResult<T>;
}

/// A mapping from type names to constructors.
pub struct Registry<T> {
    constructors: BTreeMap<String, Constructor<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(ConfigDict) -> BANetResult<T> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
        self
    }

    /// Register a constructor whose arguments are decoded into `C` first.
    ///
    /// The spec's arguments are merged over the serialized `defaults`, so a
    /// spec only needs the fields it changes. Decoding failures surface as
    /// [`BANetError::InvalidArguments`].
    pub fn register_config<C, F>(
        &mut self,
        name: impl Into<String>,
        defaults: C,
        init: F,
    ) -> &mut Self
    where
        C: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fn(C) -> T + Send + Sync + 'static,
    {
        let name = name.into();
        let type_name = name.clone();
        self.register(name, move |args: ConfigDict| {
            let invalid = |err: serde_json::Error| BANetError::InvalidArguments {
                name: type_name.clone(),
                reason: err.to_string(),
            };

            let mut merged = match serde_json::to_value(&defaults).map_err(invalid)? {
                serde_json::Value::Object(map) => ConfigDict::from(map),
                _ => ConfigDict::new(),
            };
            merged.merge(args);

            let config = merged.decode::<C>().map_err(invalid)?;
            Ok(init(config))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Build an object from `spec`, resolving its type in this registry.
    pub fn build(&self, spec: &ConfigDict, defaults: &ConfigDict) -> BANetResult<T> {
        build_object(spec, self, defaults)
    }

    /// Build an object from `spec`, resolving its type on `parent`.
    pub fn build_with_parent(
        &self,
        spec: &ConfigDict,
        parent: Option<&dyn Factory<T>>,
        defaults: &ConfigDict,
    ) -> BANetResult<T> {
        match parent {
            Some(parent) => build_object(spec, parent, defaults),
            None => self.build(spec, defaults),
        }
    }
}

impl<T> Factory<T> for Registry<T> {
    fn construct(&self, name: &str, args: ConfigDict) -> BANetResult<T> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| BANetError::UnknownType {
                name: name.to_string(),
                known: self.names(),
            })?;
        constructor(args)
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.names())
            .finish()
    }
}

/// Build an object described by `spec` using `factory`.
///
/// The spec is copied and never mutated. Its `type` field is removed and used
/// as the type name; every entry of `defaults` missing from the spec is added,
/// so explicit spec values always win. Errors raised by the constructor are
/// returned unchanged.
pub fn build_object<T, F>(
    spec: &ConfigDict,
    factory: &F,
    defaults: &ConfigDict,
) -> BANetResult<T>
where
    F: Factory<T> + ?Sized,
{
    let mut args = spec.clone();
    let name = match args.remove(TYPE_KEY) {
        Some(ConfigValue::String(name)) => name,
        Some(_) => {
            return Err(BANetError::InvalidValue {
                key: TYPE_KEY.to_string(),
                expected: "a string",
            })
        }
        None => {
            return Err(BANetError::MissingField {
                field: TYPE_KEY.to_string(),
            })
        }
    };

    for (key, value) in defaults {
        if args.set_default(key.as_str(), value.clone()) {
            trace!("default argument '{key}' applied to '{name}'");
        }
    }

    debug!(
        "building '{name}' with arguments [{}]",
        args.keys().collect::<Vec<_>>().join(", ")
    );
    factory.construct(&name, args)
}
