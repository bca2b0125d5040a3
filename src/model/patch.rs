use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One field of a partial-update request.
///
/// A JSON key that is missing deserializes to `Absent` (leave the stored value
/// alone); a key that is present deserializes to `Present`, which replaces the
/// whole stored value. Nullable fields use `Patch<Option<T>>` so that an
/// explicit `null` arrives as `Present(None)` and clears the value.
///
/// Fields must be annotated with `#[serde(default)]` for the missing-key case.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Present(v) => Patch::Present(v),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Absent => None,
            Patch::Present(v) => Some(v),
        }
    }

    /// Overwrite `target` when a value was supplied.
    pub fn apply_to(self, target: &mut T) {
        if let Patch::Present(v) = self {
            *target = v;
        }
    }

    /// Map a supplied value, propagating conversion failures.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        match self {
            Patch::Absent => Ok(Patch::Absent),
            Patch::Present(v) => f(v).map(Patch::Present),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Present(v),
            None => Patch::Absent,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Patch::Present)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Absent => serializer.serialize_none(),
            Patch::Present(v) => v.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        weight: Patch<Option<f64>>,
    }

    #[test]
    fn test_missing_null_and_value_are_distinct() {
        let missing: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.name, Patch::Absent);
        assert_eq!(missing.weight, Patch::Absent);

        let cleared: Sample = serde_json::from_str(r#"{"weight": null}"#).unwrap();
        assert_eq!(cleared.weight, Patch::Present(None));

        let set: Sample = serde_json::from_str(r#"{"name": "", "weight": 4.5}"#).unwrap();
        assert_eq!(set.name, Patch::Present(String::new()));
        assert_eq!(set.weight, Patch::Present(Some(4.5)));
    }

    #[test]
    fn test_null_for_non_nullable_field_is_rejected() {
        assert!(serde_json::from_str::<Sample>(r#"{"name": null}"#).is_err());
    }

    #[test]
    fn test_apply_to_only_overwrites_present() {
        let mut value = "kept".to_string();
        Patch::Absent.apply_to(&mut value);
        assert_eq!(value, "kept");

        Patch::Present("replaced".to_string()).apply_to(&mut value);
        assert_eq!(value, "replaced");
    }
}
