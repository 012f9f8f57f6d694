//! Depth-bounded serialization.
//!
//! [`Bounded`] wraps any `Serialize` value and forwards it to the real serializer one level at a
//! time, failing as soon as containers nest past the limit. Cyclic `Rc` graphs and hand-built
//! values of any depth therefore stop with an error instead of exhausting the stack.

use serde::ser::{self, Serialize, Serializer};

/// Transparent wrappers (`Some`, newtype structs and variants) do not open a container but
/// still recurse; they may nest this many times per allowed container level.
const FRAMES_PER_LEVEL: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Level {
    depth: usize,
    frames: usize,
    limit: usize,
}

impl Level {
    fn too_deep<E: ser::Error>(self) -> E {
        E::custom(format!("nesting deeper than {} levels", self.limit))
    }

    /// Fails when a container opened at this level would exceed the limit.
    fn open<E: ser::Error>(self) -> Result<(), E> {
        if self.depth >= self.limit {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn element<T: ?Sized>(self, value: &T) -> Bounded<'_, T> {
        Bounded {
            value,
            level: Self {
                depth: self.depth + 1,
                frames: self.frames + 1,
                limit: self.limit,
            },
        }
    }

    fn wrapped<T: ?Sized>(self, value: &T) -> Bounded<'_, T> {
        Bounded {
            value,
            level: Self {
                frames: self.frames + 1,
                ..self
            },
        }
    }
}

/// A value that serializes exactly like `T`, but with at most `limit` nested containers.
pub(crate) struct Bounded<'a, T: ?Sized> {
    value: &'a T,
    level: Level,
}

impl<'a, T: ?Sized> Bounded<'a, T> {
    pub(crate) fn new(value: &'a T, limit: usize) -> Self {
        Self {
            value,
            level: Level {
                depth: 0,
                frames: 0,
                limit,
            },
        }
    }
}

impl<T: Serialize + ?Sized> Serialize for Bounded<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.level.frames > self.level.limit.saturating_mul(FRAMES_PER_LEVEL) {
            return Err(self.level.too_deep());
        }
        self.value.serialize(Guard {
            inner: serializer,
            level: self.level,
        })
    }
}

/// Serializer (and compound serializer) adapter that routes every child through [`Bounded`].
struct Guard<S> {
    inner: S,
    level: Level,
}

impl<S> Guard<S> {
    fn nest<C>(level: Level, inner: C) -> Guard<C> {
        Guard { inner, level }
    }
}

macro_rules! forward_scalars {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Self::Ok, Self::Error> {
                self.inner.$method(v)
            }
        )*
    };
}

impl<S: Serializer> Serializer for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Guard<S::SerializeSeq>;
    type SerializeTuple = Guard<S::SerializeTuple>;
    type SerializeTupleStruct = Guard<S::SerializeTupleStruct>;
    type SerializeTupleVariant = Guard<S::SerializeTupleVariant>;
    type SerializeMap = Guard<S::SerializeMap>;
    type SerializeStruct = Guard<S::SerializeStruct>;
    type SerializeStructVariant = Guard<S::SerializeStructVariant>;

    forward_scalars! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.inner.serialize_none()
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        self.inner.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.inner.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        self.inner.serialize_some(&self.level.wrapped(value))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        self.inner.serialize_newtype_struct(name, &self.level.wrapped(value))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        self.inner.serialize_newtype_variant(
            name,
            variant_index,
            variant,
            &self.level.wrapped(value),
        )
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        self.level.open::<S::Error>()?;
        let inner = self.inner.serialize_seq(len)?;
        Ok(Self::nest(self.level, inner))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.level.open::<S::Error>()?;
        let inner = self.inner.serialize_tuple(len)?;
        Ok(Self::nest(self.level, inner))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.level.open::<S::Error>()?;
        let inner = self.inner.serialize_tuple_struct(name, len)?;
        Ok(Self::nest(self.level, inner))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.level.open::<S::Error>()?;
        let inner = self
            .inner
            .serialize_tuple_variant(name, variant_index, variant, len)?;
        Ok(Self::nest(self.level, inner))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        self.level.open::<S::Error>()?;
        let inner = self.inner.serialize_map(len)?;
        Ok(Self::nest(self.level, inner))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.level.open::<S::Error>()?;
        let inner = self.inner.serialize_struct(name, len)?;
        Ok(Self::nest(self.level, inner))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.level.open::<S::Error>()?;
        let inner = self
            .inner
            .serialize_struct_variant(name, variant_index, variant, len)?;
        Ok(Self::nest(self.level, inner))
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

impl<S: ser::SerializeSeq> ser::SerializeSeq for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), S::Error> {
        self.inner.serialize_element(&self.level.element(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}

impl<S: ser::SerializeTuple> ser::SerializeTuple for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), S::Error> {
        self.inner.serialize_element(&self.level.element(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}

impl<S: ser::SerializeTupleStruct> ser::SerializeTupleStruct for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), S::Error> {
        self.inner.serialize_field(&self.level.element(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}

impl<S: ser::SerializeTupleVariant> ser::SerializeTupleVariant for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), S::Error> {
        self.inner.serialize_field(&self.level.element(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}

impl<S: ser::SerializeMap> ser::SerializeMap for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), S::Error> {
        self.inner.serialize_key(&self.level.element(key))
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), S::Error> {
        self.inner.serialize_value(&self.level.element(value))
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}

impl<S: ser::SerializeStruct> ser::SerializeStruct for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), S::Error> {
        self.inner.serialize_field(key, &self.level.element(value))
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), S::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}

impl<S: ser::SerializeStructVariant> ser::SerializeStructVariant for Guard<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), S::Error> {
        self.inner.serialize_field(key, &self.level.element(value))
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), S::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}
