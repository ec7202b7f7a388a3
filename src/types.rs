/// Identifier of a user in the interaction log (dense, dictionary-assigned).
/// Example: `0` for the first user encountered by the reader.
pub type UserId = usize;
/// Identifier of a tagged resource (dense, dictionary-assigned).
pub type ResourceId = usize;
/// Identifier of a tag (dense, dictionary-assigned).
pub type TagId = usize;
/// Identifier of a category label attached to an interaction.
pub type CategoryId = usize;
/// Opaque interaction timestamp, carried verbatim from the log.
/// Example: `2010-11-01 18:35:40`
pub type Timestamp = String;
/// Interaction rating; `constants::record::MISSING_RATING` means absent.
pub type Rating = f64;
/// Identifier inside a prediction row. Signed so oracle rows can be
/// right-padded with the `-1` sentinel.
pub type PredictedId = i64;
