//! Parses posted attribute fields into a [`Selection`] and back, and validates
//! a selection against the mapping rules. Each operation dispatches on
//! [`AttributeControlType`] in exactly one `match`.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::resources::{self, ResourceMessage};
use crate::domain::attribute::{AttributeControlType, MappingId, ProductAttributeMapping};
use crate::domain::product::Product;
use crate::domain::selection::Selection;

pub const ATTRIBUTE_FIELD_PREFIX: &str = "product_attribute_";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub key: String,
    pub value: String,
}

/// Transport-neutral posted form: ordered key/value pairs, keys may repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeForm {
    fields: Vec<FormField>,
}

impl AttributeForm {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push(FormField { key: key.into(), value: value.into() });
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|field| field.key == key).map(|field| field.value.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields.iter().filter(move |field| field.key == key).map(|field| field.value.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeForm {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| FormField { key: key.into(), value: value.into() })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeWarning {
    pub mapping_id: MappingId,
    pub message: ResourceMessage,
}

pub fn field_key(mapping_id: &MappingId) -> String {
    format!("{ATTRIBUTE_FIELD_PREFIX}{}", mapping_id.0)
}

fn date_part_key(mapping_id: &MappingId, part: &str) -> String {
    format!("{ATTRIBUTE_FIELD_PREFIX}{}_{part}", mapping_id.0)
}

/// Never fails: unknown keys are ignored and malformed values leave the
/// mapping without an entry. Required-field checks belong to [`validate`].
pub fn parse(mappings: &[ProductAttributeMapping], form: &AttributeForm) -> Selection {
    let mut selection = Selection::default();
    for mapping in mappings {
        parse_mapping(mapping, form, &mut selection);
    }
    selection
}

fn parse_mapping(mapping: &ProductAttributeMapping, form: &AttributeForm, selection: &mut Selection) {
    let key = field_key(&mapping.id);
    match mapping.control_type {
        AttributeControlType::DropdownList
        | AttributeControlType::RadioList
        | AttributeControlType::ColorSquares
        | AttributeControlType::ImageSquares => {
            let picked = form.get(&key).map(str::trim).filter(|raw| mapping.value(raw).is_some());
            if let Some(value_id) = picked {
                selection.push(mapping.id.clone(), value_id);
            }
        }
        AttributeControlType::Checkboxes => {
            let picked = form
                .get_all(&key)
                .flat_map(|raw| checkbox_values(mapping, raw))
                .filter(|raw| mapping.value(raw).is_some());
            for value_id in picked {
                if !selection.contains(&mapping.id, value_id) {
                    selection.push(mapping.id.clone(), value_id);
                }
            }
        }
        AttributeControlType::ReadonlyCheckboxes => {
            for value in mapping.values.iter().filter(|value| value.is_pre_selected) {
                selection.push(mapping.id.clone(), value.id.0.clone());
            }
        }
        AttributeControlType::TextBox | AttributeControlType::MultilineTextbox => {
            let text = form.get(&key).map(str::trim).filter(|text| !text.is_empty());
            if let Some(text) = text {
                selection.push(mapping.id.clone(), text);
            }
        }
        AttributeControlType::Datepicker => {
            if let Some(date) = parse_date_parts(&mapping.id, form) {
                selection.push(mapping.id.clone(), date.format(DATE_FORMAT).to_string());
            }
        }
        AttributeControlType::FileUpload => {
            let guid = form.get(&key).and_then(|raw| Uuid::parse_str(raw.trim()).ok());
            if let Some(guid) = guid {
                selection.push(mapping.id.clone(), guid.hyphenated().to_string());
            }
        }
    }
}

/// A posted checkbox field carries either one value id or a comma-joined
/// list. An exact id match wins so ids containing `,` stay selectable.
fn checkbox_values<'a>(mapping: &ProductAttributeMapping, raw: &'a str) -> Vec<&'a str> {
    let raw = raw.trim();
    if mapping.value(raw).is_some() {
        return vec![raw];
    }
    raw.split(',').map(str::trim).collect()
}

fn parse_date_parts(mapping_id: &MappingId, form: &AttributeForm) -> Option<NaiveDate> {
    let part = |name: &str| -> Option<u32> {
        form.get(&date_part_key(mapping_id, name)).and_then(|raw| raw.trim().parse().ok())
    };
    let year = form.get(&date_part_key(mapping_id, "year")).and_then(|raw| raw.trim().parse().ok())?;
    NaiveDate::from_ymd_opt(year, part("month")?, part("day")?)
}

/// Inverse of [`parse`]. Entries for unknown mappings are dropped.
pub fn format(mappings: &[ProductAttributeMapping], selection: &Selection) -> AttributeForm {
    let mut form = AttributeForm::default();
    for entry in selection.entries() {
        let Some(mapping) = mappings.iter().find(|mapping| mapping.id == entry.key) else {
            continue;
        };
        let key = field_key(&mapping.id);
        match mapping.control_type {
            AttributeControlType::DropdownList
            | AttributeControlType::RadioList
            | AttributeControlType::ColorSquares
            | AttributeControlType::ImageSquares
            | AttributeControlType::Checkboxes
            | AttributeControlType::ReadonlyCheckboxes
            | AttributeControlType::TextBox
            | AttributeControlType::MultilineTextbox
            | AttributeControlType::FileUpload => form.push(key, entry.value.clone()),
            AttributeControlType::Datepicker => {
                if let Ok(date) = NaiveDate::parse_from_str(&entry.value, DATE_FORMAT) {
                    form.push(date_part_key(&mapping.id, "day"), date.format("%-d").to_string());
                    form.push(date_part_key(&mapping.id, "month"), date.format("%-m").to_string());
                    form.push(date_part_key(&mapping.id, "year"), date.format("%Y").to_string());
                }
            }
        }
    }
    form
}

/// Initial selection for a first page render.
pub fn preselected(product: &Product) -> Selection {
    let mut selection = Selection::default();
    for mapping in &product.attribute_mappings {
        let mut pre_selected = mapping.values.iter().filter(|value| value.is_pre_selected);
        match mapping.control_type {
            AttributeControlType::DropdownList
            | AttributeControlType::RadioList
            | AttributeControlType::ColorSquares
            | AttributeControlType::ImageSquares => {
                if let Some(value) = pre_selected.next() {
                    selection.push(mapping.id.clone(), value.id.0.clone());
                }
            }
            AttributeControlType::Checkboxes | AttributeControlType::ReadonlyCheckboxes => {
                for value in pre_selected {
                    selection.push(mapping.id.clone(), value.id.0.clone());
                }
            }
            AttributeControlType::TextBox | AttributeControlType::MultilineTextbox => {
                let default_text = mapping
                    .validation
                    .default_value
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty());
                if let Some(text) = default_text {
                    selection.push(mapping.id.clone(), text);
                }
            }
            AttributeControlType::Datepicker | AttributeControlType::FileUpload => {}
        }
    }
    selection
}

/// Required-field and length checks. Mappings listed in `disabled` are
/// hidden by an unmet condition and never required.
pub fn validate(
    mappings: &[ProductAttributeMapping],
    selection: &Selection,
    disabled: &BTreeSet<MappingId>,
) -> Vec<AttributeWarning> {
    let mut warnings = Vec::new();
    for mapping in mappings.iter().filter(|mapping| !disabled.contains(&mapping.id)) {
        let mut warn = |message: ResourceMessage| {
            warnings.push(AttributeWarning { mapping_id: mapping.id.clone(), message });
        };
        let selected = selection.has_mapping(&mapping.id);
        match mapping.control_type {
            AttributeControlType::DropdownList
            | AttributeControlType::RadioList
            | AttributeControlType::ColorSquares
            | AttributeControlType::ImageSquares
            | AttributeControlType::Checkboxes
            | AttributeControlType::ReadonlyCheckboxes
            | AttributeControlType::Datepicker
            | AttributeControlType::FileUpload => {
                if mapping.is_required && !selected {
                    warn(ResourceMessage::with_args(resources::SELECT_ATTRIBUTE, [mapping.name.as_str()]));
                }
            }
            AttributeControlType::TextBox | AttributeControlType::MultilineTextbox => {
                let text = selection.values_for(&mapping.id).next().unwrap_or_default();
                if text.is_empty() {
                    if mapping.is_required {
                        warn(ResourceMessage::with_args(
                            resources::ENTER_ATTRIBUTE_VALUE,
                            [mapping.name.as_str()],
                        ));
                    }
                    continue;
                }
                let length = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                if let Some(min) = mapping.validation.min_length.filter(|min| length < *min) {
                    warn(ResourceMessage::with_args(
                        resources::TEXTBOX_MINIMUM_LENGTH,
                        [mapping.name.clone(), min.to_string()],
                    ));
                }
                if let Some(max) = mapping.validation.max_length.filter(|max| length > *max) {
                    warn(ResourceMessage::with_args(
                        resources::TEXTBOX_MAXIMUM_LENGTH,
                        [mapping.name.clone(), max.to_string()],
                    ));
                }
            }
        }
    }
    warnings
}

/// Checks an uploaded file before its guid is accepted into a selection.
pub fn validate_upload(
    mapping: &ProductAttributeMapping,
    file_name: &str,
    size_bytes: u64,
) -> Vec<ResourceMessage> {
    let mut messages = Vec::new();
    let allowed = &mapping.validation.allowed_file_extensions;
    if !allowed.is_empty() {
        let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        let permitted = extension.as_deref().is_some_and(|ext| {
            allowed.iter().any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
        });
        if !permitted {
            messages.push(ResourceMessage::with_args(resources::ALLOWED_EXTENSIONS, [allowed.join(", ")]));
        }
    }
    if let Some(max_kb) = mapping.validation.max_file_size_kb {
        if size_bytes > max_kb.saturating_mul(1024) {
            messages.push(ResourceMessage::with_args(
                resources::MAXIMUM_UPLOADED_FILE_SIZE,
                [max_kb.to_string()],
            ));
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{format, parse, preselected, validate, validate_upload, AttributeForm};
    use crate::catalog::resources;
    use crate::catalog::testing::{mapping, value};
    use crate::domain::attribute::{AttributeControlType, MappingId};
    use crate::domain::product::Product;
    use crate::domain::selection::{CustomAttribute, Selection};

    fn mappings() -> Vec<crate::domain::attribute::ProductAttributeMapping> {
        let mut engraving = mapping("engraving", "Engraving", AttributeControlType::TextBox, vec![]);
        engraving.validation.min_length = Some(2);
        engraving.validation.max_length = Some(8);
        vec![
            mapping(
                "color",
                "Color",
                AttributeControlType::DropdownList,
                vec![value("red", "Red"), value("blue", "Blue")],
            ),
            mapping(
                "extras",
                "Extras",
                AttributeControlType::Checkboxes,
                vec![value("wrap", "Gift wrap"), value("card", "Card"), value("bow", "Bow")],
            ),
            engraving,
            mapping("delivery", "Delivery date", AttributeControlType::Datepicker, vec![]),
            mapping("artwork", "Artwork", AttributeControlType::FileUpload, vec![]),
        ]
    }

    #[test]
    fn parses_single_repeated_and_free_form_fields() {
        let form: AttributeForm = [
            ("product_attribute_color", "blue"),
            ("product_attribute_extras", "wrap,card"),
            ("product_attribute_extras", "bow"),
            ("product_attribute_engraving", "  J.D.  "),
            ("product_attribute_delivery_day", "7"),
            ("product_attribute_delivery_month", "3"),
            ("product_attribute_delivery_year", "2026"),
            ("product_attribute_artwork", "6F9619FF-8B86-D011-B42D-00CF4FC964FF"),
            ("unrelated_field", "ignored"),
        ]
        .into_iter()
        .collect();

        let selection = parse(&mappings(), &form);
        let expected: Selection = [
            CustomAttribute::new("color", "blue"),
            CustomAttribute::new("extras", "wrap"),
            CustomAttribute::new("extras", "card"),
            CustomAttribute::new("extras", "bow"),
            CustomAttribute::new("engraving", "J.D."),
            CustomAttribute::new("delivery", "2026-03-07"),
            CustomAttribute::new("artwork", "6f9619ff-8b86-d011-b42d-00cf4fc964ff"),
        ]
        .into_iter()
        .collect();

        assert!(selection.is_equivalent(&expected), "unexpected selection: {selection:?}");
    }

    #[test]
    fn malformed_values_leave_the_mapping_empty() {
        let form: AttributeForm = [
            ("product_attribute_color", "purple"),
            ("product_attribute_extras", "wrap,,nonsense"),
            ("product_attribute_engraving", "   "),
            ("product_attribute_delivery_day", "31"),
            ("product_attribute_delivery_month", "2"),
            ("product_attribute_delivery_year", "2026"),
            ("product_attribute_artwork", "not-a-guid"),
        ]
        .into_iter()
        .collect();

        let selection = parse(&mappings(), &form);

        assert_eq!(selection.entries(), &[CustomAttribute::new("extras", "wrap")]);
    }

    #[test]
    fn format_then_parse_reproduces_the_selection() {
        let original: Selection = [
            CustomAttribute::new("extras", "card"),
            CustomAttribute::new("color", "red"),
            CustomAttribute::new("extras", "wrap"),
            CustomAttribute::new("engraving", "AB"),
            CustomAttribute::new("delivery", "2026-11-02"),
            CustomAttribute::new("artwork", "6f9619ff-8b86-d011-b42d-00cf4fc964ff"),
        ]
        .into_iter()
        .collect();

        let form = format(&mappings(), &original);
        let reparsed = parse(&mappings(), &form);

        assert!(reparsed.is_equivalent(&original));
        assert!(form.get("product_attribute_delivery_day").is_some_and(|day| day == "2"));
    }

    #[test]
    fn readonly_checkboxes_ignore_posted_values() {
        let mut locked = value("warranty", "Warranty");
        locked.is_pre_selected = true;
        let mappings = vec![mapping(
            "service",
            "Service",
            AttributeControlType::ReadonlyCheckboxes,
            vec![locked, value("insurance", "Insurance")],
        )];
        let form: AttributeForm = [("product_attribute_service", "insurance")].into_iter().collect();

        let selection = parse(&mappings, &form);

        assert_eq!(selection.entries(), &[CustomAttribute::new("service", "warranty")]);
    }

    #[test]
    fn preselection_takes_one_value_for_single_choice_controls() {
        let mut red = value("red", "Red");
        red.is_pre_selected = true;
        let mut blue = value("blue", "Blue");
        blue.is_pre_selected = true;
        let mut wrap = value("wrap", "Wrap");
        wrap.is_pre_selected = true;
        let mut note = mapping("note", "Note", AttributeControlType::TextBox, vec![]);
        note.validation.default_value = Some("Happy birthday".to_owned());
        let product = Product {
            attribute_mappings: vec![
                mapping("color", "Color", AttributeControlType::RadioList, vec![red, blue]),
                mapping("extras", "Extras", AttributeControlType::Checkboxes, vec![wrap, value("bow", "Bow")]),
                note,
            ],
            ..Product::default()
        };

        let selection = preselected(&product);

        assert_eq!(
            selection.entries(),
            &[
                CustomAttribute::new("color", "red"),
                CustomAttribute::new("extras", "wrap"),
                CustomAttribute::new("note", "Happy birthday"),
            ]
        );
    }

    #[test]
    fn validation_reports_required_and_length_rules() {
        let mut mappings = mappings();
        for mapping in &mut mappings {
            mapping.is_required = true;
        }
        let selection: Selection = [CustomAttribute::new("engraving", "This is too long")].into_iter().collect();
        let disabled: BTreeSet<MappingId> = [MappingId("artwork".to_owned())].into_iter().collect();

        let warnings = validate(&mappings, &selection, &disabled);
        let keys: Vec<(&str, &str)> = warnings
            .iter()
            .map(|warning| (warning.mapping_id.0.as_str(), warning.message.resource_key.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("color", resources::SELECT_ATTRIBUTE),
                ("extras", resources::SELECT_ATTRIBUTE),
                ("engraving", resources::TEXTBOX_MAXIMUM_LENGTH),
                ("delivery", resources::SELECT_ATTRIBUTE),
            ]
        );
        assert_eq!(warnings[2].message.args, vec!["Engraving".to_owned(), "8".to_owned()]);
    }

    #[test]
    fn text_length_counts_characters_not_bytes() {
        let mappings = mappings();
        let selection: Selection = [CustomAttribute::new("engraving", "ÄÖÜßéèêñ")].into_iter().collect();

        let warnings = validate(&mappings, &selection, &BTreeSet::new());

        assert!(warnings.is_empty(), "eight characters fit the limit: {warnings:?}");
    }

    #[test]
    fn checkbox_value_ids_with_commas_round_trip() {
        let mappings = vec![mapping(
            "toppings",
            "Toppings",
            AttributeControlType::Checkboxes,
            vec![value("salt,pepper", "Salt and pepper"), value("salt", "Salt"), value("pepper", "Pepper")],
        )];
        let original: Selection = [CustomAttribute::new("toppings", "salt,pepper")].into_iter().collect();

        let reparsed = parse(&mappings, &format(&mappings, &original));
        let joined: AttributeForm = [("product_attribute_toppings", "salt, pepper")].into_iter().collect();

        assert_eq!(reparsed.entries(), &[CustomAttribute::new("toppings", "salt,pepper")]);
        assert_eq!(
            parse(&mappings, &joined).entries(),
            &[CustomAttribute::new("toppings", "salt"), CustomAttribute::new("toppings", "pepper")]
        );
    }

    #[test]
    fn upload_checks_extension_and_size() {
        let mut artwork = mapping("artwork", "Artwork", AttributeControlType::FileUpload, vec![]);
        artwork.validation.allowed_file_extensions = vec!["png".to_owned(), ".jpg".to_owned()];
        artwork.validation.max_file_size_kb = Some(100);

        assert!(validate_upload(&artwork, "logo.JPG", 10 * 1024).is_empty());

        let rejected = validate_upload(&artwork, "logo.gif", 200 * 1024);
        let keys: Vec<&str> = rejected.iter().map(|message| message.resource_key.as_str()).collect();
        assert_eq!(keys, vec![resources::ALLOWED_EXTENSIONS, resources::MAXIMUM_UPLOADED_FILE_SIZE]);
    }
}
