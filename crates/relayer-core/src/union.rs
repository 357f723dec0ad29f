//! Discriminated union containers.
//!
//! A union container holds exactly one variant in serialized form together with
//! its `type` tag. The tag is read by a partial decode of the payload, so a
//! container can be inspected without knowing which variant it holds. Every
//! family (tasks, events, task items) is a newtype over [`RawUnion`] that
//! implements [`UnionContainer`] through [`union_registry!`](crate::union_registry).

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{ApiError, Result};

/// Wire key holding the discriminator.
pub const TAG_KEY: &str = "type";

/// A concrete record belonging to exactly one union family.
pub trait Variant: Serialize + DeserializeOwned {
    /// Fixed discriminator written to the `type` key.
    const TAG: &'static str;

    /// Rust name of the record, used in error messages.
    const NAME: &'static str;

    /// The union family this variant belongs to.
    type Union: UnionContainer;
}

/// Typed access to a union family.
///
/// Implemented by [`union_registry!`](crate::union_registry); callers only use
/// the provided methods.
pub trait UnionContainer: Sized {
    /// Closed sum of every variant of the family.
    type Value;

    fn from_raw(raw: RawUnion) -> Self;

    fn raw(&self) -> &RawUnion;

    fn raw_mut(&mut self) -> &mut RawUnion;

    /// Decode the stored payload into the variant named by the tag.
    fn decode_value(raw: &RawUnion) -> Result<Self::Value>;

    /// Build a container holding `variant`.
    fn from_variant<V>(variant: &V) -> Result<Self>
    where
        V: Variant<Union = Self>,
    {
        RawUnion::encode(variant).map(Self::from_raw)
    }

    /// Decode the container as `V`.
    ///
    /// The tag is checked before any decoding happens.
    fn as_variant<V>(&self) -> Result<V>
    where
        V: Variant<Union = Self>,
    {
        self.raw().decode_as::<V>()
    }

    /// Overlay the fields of `variant` onto the stored payload.
    ///
    /// Keys absent from `variant` are kept as they are on the wire.
    fn merge_variant<V>(&mut self, variant: &V) -> Result<()>
    where
        V: Variant<Union = Self>,
    {
        self.raw_mut().overlay(variant)
    }

    fn discriminator(&self) -> Result<&str> {
        self.raw().discriminator()
    }

    fn value_by_discriminator(&self) -> Result<Self::Value> {
        Self::decode_value(self.raw())
    }
}

/// Untyped storage shared by every union family.
///
/// An empty container has no tag and no payload. Once set, the payload is
/// always a JSON object whose `type` key equals the tag, unless it was decoded
/// from a wire object without one.
#[derive(Debug, Clone, Default)]
pub struct RawUnion {
    discriminator: String,
    payload: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
struct TagShadow {
    #[serde(rename = "type", default)]
    tag: Option<String>,
}

impl RawUnion {
    /// Serialize `variant` with its tag as the leading key.
    pub fn encode<V: Variant>(variant: &V) -> Result<Self> {
        let fields = encode_fields(variant)?;
        Self::from_fields(V::TAG, fields)
    }

    /// Wrap a raw wire object, reading its tag.
    pub fn from_raw_value(payload: Box<RawValue>) -> Result<Self> {
        if !payload.get().trim_start().starts_with('{') {
            return Err(ApiError::Decode {
                target: "union",
                message: "expected a JSON object".to_string(),
            });
        }

        let shadow: TagShadow =
            serde_json::from_str(payload.get()).map_err(|e| ApiError::decode("union tag", e))?;
        let discriminator = shadow.tag.unwrap_or_default();
        trace!(discriminator = %discriminator, "decoded union container");

        Ok(Self {
            discriminator,
            payload: Some(payload),
        })
    }

    /// Parse a JSON document into a container.
    pub fn from_json(json: &str) -> Result<Self> {
        let payload: Box<RawValue> =
            serde_json::from_str(json).map_err(|e| ApiError::decode("union", e))?;
        Self::from_raw_value(payload)
    }

    fn from_fields(tag: &str, fields: Map<String, Value>) -> Result<Self> {
        let payload =
            serde_json::value::to_raw_value(&fields).map_err(|e| ApiError::encode("union", e))?;
        Ok(Self {
            discriminator: tag.to_string(),
            payload: Some(payload),
        })
    }

    /// The stored tag; fails with [`ApiError::EmptyUnion`] when none is set.
    pub fn discriminator(&self) -> Result<&str> {
        if self.discriminator.is_empty() {
            return Err(ApiError::EmptyUnion);
        }
        Ok(&self.discriminator)
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    /// The serialized variant, if any.
    pub fn payload(&self) -> Option<&RawValue> {
        self.payload.as_deref()
    }

    /// Decode the payload as `V` after checking the tag.
    pub fn decode_as<V: Variant>(&self) -> Result<V> {
        let actual = self.discriminator()?;
        if actual != V::TAG {
            return Err(ApiError::TypeMismatch {
                expected: V::TAG,
                actual: actual.to_string(),
            });
        }

        self.decode_partial(V::NAME)
    }

    /// Decode only the fields `T` declares, ignoring the rest of the payload.
    ///
    /// Used with small shadow records to read a single key (`cost`,
    /// `eventID`, ...) without knowing the full variant shape.
    pub fn decode_partial<T: DeserializeOwned>(&self, target: &'static str) -> Result<T> {
        let payload = self.payload.as_deref().ok_or(ApiError::EmptyUnion)?;
        serde_json::from_str(payload.get()).map_err(|e| ApiError::decode(target, e))
    }

    /// Shallow overlay of `variant` onto the stored object.
    ///
    /// Top-level keys of `variant` replace existing ones in place; keys it does
    /// not serialize survive untouched. On an empty container this is the same
    /// as [`RawUnion::encode`].
    pub fn overlay<V: Variant>(&mut self, variant: &V) -> Result<()> {
        let incoming = encode_fields(variant)?;

        let mut merged = match self.payload.as_deref() {
            Some(payload) => serde_json::from_str::<Map<String, Value>>(payload.get())
                .map_err(|e| ApiError::decode("union", e))?,
            None => Map::new(),
        };

        debug!(
            tag = V::TAG,
            existing = merged.len(),
            incoming = incoming.len(),
            "merging variant into union"
        );

        for (key, value) in incoming {
            merged.insert(key, value);
        }

        *self = Self::from_fields(V::TAG, tag_first(V::TAG, merged))?;
        Ok(())
    }
}

/// Serialize a variant to an ordered map with `type` first.
fn encode_fields<V: Variant>(variant: &V) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(variant).map_err(|e| ApiError::encode(V::NAME, e))?;
    let Value::Object(fields) = value else {
        return Err(ApiError::Encode {
            target: V::NAME,
            message: "variant must serialize to a JSON object".to_string(),
        });
    };

    Ok(tag_first(V::TAG, fields))
}

/// Rebuild `fields` with `type` set to `tag` as the leading key.
fn tag_first(tag: &str, fields: Map<String, Value>) -> Map<String, Value> {
    let mut tagged = Map::with_capacity(fields.len() + 1);
    tagged.insert(TAG_KEY.to_string(), Value::String(tag.to_string()));
    for (key, value) in fields {
        if key != TAG_KEY {
            tagged.insert(key, value);
        }
    }
    tagged
}

impl PartialEq for RawUnion {
    fn eq(&self, other: &Self) -> bool {
        self.discriminator == other.discriminator
            && self.payload.as_deref().map(RawValue::get)
                == other.payload.as_deref().map(RawValue::get)
    }
}

impl Eq for RawUnion {}

impl Serialize for RawUnion {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.payload.as_deref() {
            Some(payload) => payload.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

impl<'de> Deserialize<'de> for RawUnion {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let payload = Box::<RawValue>::deserialize(deserializer)?;
        Self::from_raw_value(payload).map_err(serde::de::Error::custom)
    }
}

/// Declare the closed variant registry of a union family.
///
/// For a newtype `$union(RawUnion)` this generates the [`Variant`] impl of
/// every listed record, the `$value` sum type returned by
/// `value_by_discriminator`, and the [`UnionContainer`] impl dispatching on
/// the tag.
#[macro_export]
macro_rules! union_registry {
    (
        $(#[$meta:meta])*
        $vis:vis enum $value:ident for $union:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident($ty:ident) = $tag:literal,
            )+
        }
    ) => {
        $(
            impl $crate::union::Variant for $ty {
                const TAG: &'static str = $tag;
                const NAME: &'static str = stringify!($ty);
                type Union = $union;
            }

            impl From<$ty> for $value {
                fn from(variant: $ty) -> Self {
                    $value::$variant(variant)
                }
            }
        )+

        $(#[$meta])*
        $vis enum $value {
            $(
                $(#[$vmeta])*
                $variant($ty),
            )+
        }

        impl $value {
            /// Every tag of the registry, in declaration order.
            pub const TAGS: &'static [&'static str] = &[$($tag),+];

            /// Tag of the held variant.
            pub fn tag(&self) -> &'static str {
                match self {
                    $($value::$variant(_) => $tag,)+
                }
            }

            /// Encode the held variant into its container.
            pub fn to_union(&self) -> $crate::error::Result<$union> {
                use $crate::union::UnionContainer;
                match self {
                    $($value::$variant(variant) => $union::from_variant(variant),)+
                }
            }
        }

        impl $crate::union::UnionContainer for $union {
            type Value = $value;

            fn from_raw(raw: $crate::union::RawUnion) -> Self {
                $union(raw)
            }

            fn raw(&self) -> &$crate::union::RawUnion {
                &self.0
            }

            fn raw_mut(&mut self) -> &mut $crate::union::RawUnion {
                &mut self.0
            }

            fn decode_value(raw: &$crate::union::RawUnion) -> $crate::error::Result<$value> {
                match raw.discriminator()? {
                    $($tag => raw.decode_as::<$ty>().map($value::$variant),)+
                    other => Err($crate::error::ApiError::UnknownDiscriminator(other.to_string())),
                }
            }
        }
    };
}
