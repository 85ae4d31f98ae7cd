//! Property schema: the bulk reflection surface of a blueprint
//!
//! A [`Schema`] lists the settable attributes of a blueprint in
//! derived-to-base order. Each entry is type-erased behind [`Property`] so
//! values can travel through a [`PropertyMap`](crate::PropertyMap) as JSON.
//!
//! Inheritance is expressed by composition: a derived blueprint embeds its
//! base and appends the base schema through [`Schema::inherit`], giving the
//! projections from the derived value to the embedded base. Entries declared
//! by the derived blueprint come first, so a derived attribute shadows a
//! base attribute of the same name.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::attribute::Attribute;
use crate::contract::SetterContract;
use crate::error::{BuilderError, BuilderResult};
use crate::traits::Blueprint;

/// Type-erased settable attribute of blueprint `B`
pub trait Property<B>: 'static {
    /// Attribute name (the bulk property key)
    fn name(&self) -> &'static str;

    /// Contract the engine enforces when this property is assigned
    fn setter_contract(&self) -> SetterContract;

    /// Current value as JSON (raw getter, no contract checks)
    fn read_value(&self, blueprint: &B) -> BuilderResult<Value>;

    /// Assign from JSON (raw setter, no contract checks)
    fn write_value(&self, blueprint: &mut B, value: Value) -> BuilderResult<()>;
}

impl<B, T> Property<B> for Attribute<B, T>
where
    B: 'static,
    T: Serialize + DeserializeOwned + 'static,
{
    fn name(&self) -> &'static str {
        Attribute::name(self)
    }

    fn setter_contract(&self) -> SetterContract {
        Attribute::setter_contract(self)
    }

    fn read_value(&self, blueprint: &B) -> BuilderResult<Value> {
        serde_json::to_value(self.read(blueprint)).map_err(|e| BuilderError::property(self.name(), e))
    }

    fn write_value(&self, blueprint: &mut B, value: Value) -> BuilderResult<()> {
        let setter = self.setter().ok_or_else(|| BuilderError::property(self.name(), "attribute is read-only"))?;
        let typed: T = serde_json::from_value(value).map_err(|e| BuilderError::property(self.name(), e))?;
        setter(blueprint, typed);
        Ok(())
    }
}

/// A base blueprint's property seen through a derived blueprint
struct Inherited<D, P> {
    inner: Box<dyn Property<P>>,
    project: fn(&D) -> &P,
    project_mut: fn(&mut D) -> &mut P,
}

impl<D: 'static, P: 'static> Property<D> for Inherited<D, P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn setter_contract(&self) -> SetterContract {
        self.inner.setter_contract()
    }

    fn read_value(&self, blueprint: &D) -> BuilderResult<Value> {
        self.inner.read_value((self.project)(blueprint))
    }

    fn write_value(&self, blueprint: &mut D, value: Value) -> BuilderResult<()> {
        self.inner.write_value((self.project_mut)(blueprint), value)
    }
}

/// Ordered list of the settable attributes of blueprint `B`
pub struct Schema<B> {
    entries: Vec<Box<dyn Property<B>>>,
}

impl<B: 'static> Schema<B> {
    /// Empty schema
    pub fn new() -> Self {
        Schema { entries: Vec::new() }
    }

    /// Append a settable attribute
    ///
    /// Read-only attributes carry no parameter value and are skipped.
    pub fn attribute<T>(mut self, attribute: Attribute<B, T>) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        if attribute.is_settable() {
            self.entries.push(Box::new(attribute));
        }
        self
    }

    /// Append the schema of an embedded base blueprint
    pub fn inherit<P: Blueprint>(mut self, project: fn(&B) -> &P, project_mut: fn(&mut B) -> &mut P) -> Self {
        for inner in P::schema().entries {
            self.entries.push(Box::new(Inherited {
                inner,
                project,
                project_mut,
            }));
        }
        self
    }

    /// Withdraw every entry named `name`, inherited ones included
    ///
    /// A derived blueprint uses this to stop a base parameter from being
    /// set through it. The derived blueprint keeps reading the value through
    /// a read-only attribute of the same name.
    pub fn unsettable(mut self, name: &str) -> Self {
        self.entries.retain(|p| p.name() != name);
        self
    }

    /// Number of entries, shadowed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schema declares nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in derived-to-base order
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Property<B> + 'static)> {
        self.entries.iter().map(|e| e.as_ref())
    }

    /// First entry with this name (the most derived one)
    pub fn get(&self, name: &str) -> Option<&(dyn Property<B> + 'static)> {
        self.iter().find(|p| p.name() == name)
    }

    /// Entry names in derived-to-base order
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|p| p.name()).collect()
    }
}

impl<B: 'static> Default for Schema<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: 'static> fmt::Debug for Schema<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("names", &self.names()).finish()
    }
}
