///
/// FieldModel
/// Compile-time field declaration emitted for every record field.
///
/// `tag` carries the declarative annotation verbatim (for example
/// `"index:idx_name"` or `"index:idx_addr|r"`); an empty tag means the field
/// is stored but never indexed.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as used by patches and index declarations.
    pub name: &'static str,
    /// Rust type of the field, as written in the record declaration.
    pub ty: &'static str,
    /// Raw declarative tag.
    pub tag: &'static str,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, ty: &'static str, tag: &'static str) -> Self {
        Self { name, ty, tag }
    }
}

///
/// FieldTag
/// Parsed meaning of one field tag.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldTag {
    PrimaryKey,
    Index { name: &'static str, sharded: bool },
    Untagged,
}

impl FieldTag {
    /// Marker flag that requests a sharded index.
    pub const SHARDED_FLAG: char = 'r';

    /// Parse a tag such as `index:idx_addr|r;comment`.
    ///
    /// Parts are `;`-separated. A primary-key part wins over everything else;
    /// otherwise the first `index:` part decides. Unknown parts are ignored.
    #[must_use]
    pub fn parse(tag: &'static str) -> Self {
        let mut parsed = Self::Untagged;

        for part in tag.split(';').map(str::trim) {
            if part == "primaryKey" || part == "primary_key" {
                return Self::PrimaryKey;
            }

            if parsed != Self::Untagged {
                continue;
            }

            if let Some(decl) = part.strip_prefix("index:") {
                let (name, flags) = decl.split_once('|').unwrap_or((decl, ""));
                parsed = Self::Index {
                    name: name.trim(),
                    sharded: flags.contains(Self::SHARDED_FLAG),
                };
            }
        }

        parsed
    }
}
