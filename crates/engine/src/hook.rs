//! Attribute declaration macro
//!
//! [`builder_attributes!`](crate::builder_attributes) turns a list of
//! attribute descriptors into named accessors on `Builder<B>`, so callers
//! write `rate.base_rate()?` and `rate.set_base_rate(2.0)?` instead of
//! passing descriptors around. Every generated accessor goes through
//! `Builder::get`/`Builder::set`, so contracts are enforced the same way.
//!
//! ```
//! use genericbuilder_engine::{
//!     builder_attributes, Attribute, Blueprint, Builder, BuilderResult, GetterContract, Schema,
//! };
//!
//! #[derive(Clone, Default)]
//! pub struct Ramp {
//!     size: usize,
//!     values: Vec<f64>,
//! }
//!
//! const SIZE: Attribute<Ramp, usize> = Attribute::settable("size", |r| r.size, |r, v| r.size = v);
//! const VALUES: Attribute<Ramp, Vec<f64>> =
//!     Attribute::read_only_with("values", |r| r.values.clone(), GetterContract::RequiresBuilt);
//!
//! builder_attributes! {
//!     /// Accessors for ramp builders
//!     pub trait RampAttributes for Ramp {
//!         size: usize = SIZE => set_size, with_size;
//!         values: Vec<f64> = VALUES;
//!     }
//! }
//!
//! impl Blueprint for Ramp {
//!     fn build(&mut self) -> BuilderResult<()> {
//!         self.values = (0..self.size).map(|i| i as f64).collect();
//!         Ok(())
//!     }
//!
//!     fn schema() -> Schema<Self> {
//!         Ramp::declared_schema()
//!     }
//! }
//!
//! let mut ramp = Builder::new(Ramp::default()).with_size(2)?;
//! ramp.build()?;
//! assert_eq!(ramp.values()?, vec![0.0, 1.0]);
//! assert_eq!(Ramp::schema().names(), vec!["size"]);
//! # Ok::<(), genericbuilder_engine::BuilderError>(())
//! ```

/// Declare named accessors for a blueprint's attributes
///
/// Each line names the accessor, its value type and the descriptor. Lines
/// with `=> set_x, with_x` are settable and also get a setter and a
/// consuming `with_` form. The macro also adds an inherent
/// `declared_schema()` to the blueprint listing the settable attributes in
/// declaration order.
///
/// Inherent `Builder` methods (`get`, `set`, `state`, ...) take precedence
/// over generated accessors with the same name.
#[macro_export]
macro_rules! builder_attributes {
    (
        $(#[$meta:meta])*
        $vis:vis trait $Trait:ident for $Blueprint:ty {
            $(
                $(#[$attr_meta:meta])*
                $attr:ident : $ty:ty = $desc:path $(=> $set:ident, $with:ident)? ;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis trait $Trait: Sized {
            $(
                $(#[$attr_meta])*
                fn $attr(&self) -> $crate::BuilderResult<$ty>;

                $(
                    #[doc = concat!("Set `", stringify!($attr), "`")]
                    fn $set(&mut self, value: $ty) -> $crate::BuilderResult<()>;

                    #[doc = concat!("Set `", stringify!($attr), "` and return the builder")]
                    fn $with(self, value: $ty) -> $crate::BuilderResult<Self>;
                )?
            )*
        }

        impl $Trait for $crate::Builder<$Blueprint> {
            $(
                fn $attr(&self) -> $crate::BuilderResult<$ty> {
                    self.get(&$desc)
                }

                $(
                    fn $set(&mut self, value: $ty) -> $crate::BuilderResult<()> {
                        self.set(&$desc, value)
                    }

                    fn $with(self, value: $ty) -> $crate::BuilderResult<Self> {
                        self.with(&$desc, value)
                    }
                )?
            )*
        }

        impl $Blueprint {
            /// Settable attributes declared for this blueprint
            #[allow(dead_code)]
            pub fn declared_schema() -> $crate::Schema<Self> {
                let schema = $crate::Schema::new();
                $(
                    let schema = $crate::__settable_attribute!(schema, $desc $(, $set)?);
                )*
                schema
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __settable_attribute {
    ($schema:expr, $desc:path) => {
        $schema
    };
    ($schema:expr, $desc:path, $set:ident) => {
        $schema.attribute($desc)
    };
}
