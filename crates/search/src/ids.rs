use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// An object that can stand in for an identifier, e.g. a [Collection](crate::Collection).
///
/// Strings are their own identifier.
///
/// # Examples
///
/// ```
/// use stac_search::{Collection, Identified};
///
/// let collection = Collection::new("naip", "National Agriculture Imagery Program");
/// assert_eq!(collection.identifier(), "naip");
/// assert_eq!("naip".identifier(), "naip");
/// ```
pub trait Identified {
    /// Returns this object's identifier.
    fn identifier(&self) -> &str;
}

/// An ordered list of identifiers, used for the `collections` and `ids` search
/// parameters.
///
/// Order is preserved and nothing is deduplicated. A single string is split on
/// commas, while each element of a list is used whole.
///
/// # Examples
///
/// ```
/// use stac_search::{Collection, Identified, Identifiers};
///
/// let expected = Identifiers::from(vec!["naip", "landsat8_l1tp"]);
/// assert_eq!(Identifiers::from("naip,landsat8_l1tp"), expected);
/// assert_eq!(Identifiers::from(["naip", "landsat8_l1tp"]), expected);
///
/// let collection = Collection::new("naip", "a description");
/// let mixed: Vec<&dyn Identified> = vec![&collection, &"landsat8_l1tp"];
/// assert_eq!(Identifiers::from(mixed), expected);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifiers(Vec<String>);

impl Identifiers {
    /// Returns these identifiers as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns these identifiers joined with commas, as used in GET query strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::Identifiers;
    ///
    /// let ids = Identifiers::from(vec!["a", "b"]);
    /// assert_eq!(ids.to_delimited(), "a,b");
    /// ```
    pub fn to_delimited(&self) -> String {
        self.0.join(",")
    }

    /// Consumes these identifiers, returning the inner vector.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

fn split_delimited(s: &str) -> Identifiers {
    Identifiers(
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
    )
}

impl Identified for str {
    fn identifier(&self) -> &str {
        self
    }
}

impl Identified for String {
    fn identifier(&self) -> &str {
        self
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}

impl<T: Identified + ?Sized> Identified for Box<T> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}

impl Deref for Identifiers {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for Identifiers {
    fn from(s: &str) -> Identifiers {
        split_delimited(s)
    }
}

impl From<String> for Identifiers {
    fn from(s: String) -> Identifiers {
        split_delimited(&s)
    }
}

impl From<crate::Collection> for Identifiers {
    fn from(collection: crate::Collection) -> Identifiers {
        Identifiers(vec![collection.id])
    }
}

impl From<&crate::Collection> for Identifiers {
    fn from(collection: &crate::Collection) -> Identifiers {
        Identifiers(vec![collection.id.clone()])
    }
}

impl<T: Identified> From<Vec<T>> for Identifiers {
    fn from(values: Vec<T>) -> Identifiers {
        values.into_iter().collect()
    }
}

impl<T: Identified, const N: usize> From<[T; N]> for Identifiers {
    fn from(values: [T; N]) -> Identifiers {
        values.into_iter().collect()
    }
}

impl<T: Identified> From<&[T]> for Identifiers {
    fn from(values: &[T]) -> Identifiers {
        values.iter().collect()
    }
}

impl<T: Identified> FromIterator<T> for Identifiers {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Identifiers {
        Identifiers(
            iter.into_iter()
                .map(|value| value.identifier().to_string())
                .collect(),
        )
    }
}

impl From<Identifiers> for Vec<String> {
    fn from(identifiers: Identifiers) -> Vec<String> {
        identifiers.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Identified, Identifiers};
    use crate::Collection;
    use rstest::rstest;

    fn expected() -> Identifiers {
        Identifiers(vec!["naip".to_string(), "landsat8_l1tp".to_string()])
    }

    #[test]
    fn single_string() {
        assert_eq!(Identifiers::from("naip").as_slice(), ["naip"]);
    }

    #[test]
    fn single_id() {
        let ids = Identifiers::from("m_3510836_se_12_060_20180508_20190331");
        assert_eq!(ids.as_slice(), ["m_3510836_se_12_060_20180508_20190331"]);
    }

    #[rstest]
    #[case::delimited(Identifiers::from("naip,landsat8_l1tp"))]
    #[case::delimited_with_spaces(Identifiers::from("naip, landsat8_l1tp"))]
    #[case::trailing_comma(Identifiers::from("naip,landsat8_l1tp,"))]
    #[case::owned_delimited(Identifiers::from("naip,landsat8_l1tp".to_string()))]
    #[case::vec_of_str(Identifiers::from(vec!["naip", "landsat8_l1tp"]))]
    #[case::vec_of_string(Identifiers::from(vec!["naip".to_string(), "landsat8_l1tp".to_string()]))]
    #[case::array(Identifiers::from(["naip", "landsat8_l1tp"]))]
    #[case::slice(Identifiers::from(&["naip", "landsat8_l1tp"][..]))]
    fn shapes(#[case] ids: Identifiers) {
        assert_eq!(ids, expected());
    }

    #[test]
    fn generator() {
        fn collectioner() -> impl Iterator<Item = String> {
            ["naip", "landsat8_l1tp"].into_iter().map(String::from)
        }
        let ids: Identifiers = collectioner().collect();
        assert_eq!(ids, expected());
    }

    #[test]
    fn list_elements_are_not_split() {
        let ids = Identifiers::from(vec!["a,b", "c"]);
        assert_eq!(ids.as_slice(), ["a,b", "c"]);
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let ids = Identifiers::from("b,a,b");
        assert_eq!(ids.as_slice(), ["b", "a", "b"]);
    }

    #[test]
    fn collection_object() {
        let collection = Collection::new("landsat8_l1tp", "Landsat 8");
        assert_eq!(Identifiers::from(&collection).as_slice(), ["landsat8_l1tp"]);
        assert_eq!(Identifiers::from(collection).as_slice(), ["landsat8_l1tp"]);
    }

    #[test]
    fn mixed_collection_object_and_string() {
        let collection = Collection::new("landsat8_l1tp", "Landsat 8");
        let mixed: Vec<&dyn Identified> = vec![&collection, &"naip"];
        assert_eq!(
            Identifiers::from(mixed).as_slice(),
            ["landsat8_l1tp", "naip"]
        );
    }

    #[test]
    fn boxed_mixed() {
        let mixed: Vec<Box<dyn Identified>> = vec![
            Box::new(Collection::new("landsat8_l1tp", "Landsat 8")),
            Box::new("naip".to_string()),
        ];
        let ids: Identifiers = mixed.into_iter().collect();
        assert_eq!(ids.as_slice(), ["landsat8_l1tp", "naip"]);
    }

    #[test]
    fn delimited() {
        assert_eq!(expected().to_delimited(), "naip,landsat8_l1tp");
    }
}
