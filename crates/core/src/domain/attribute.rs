use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MappingId(pub String);

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeControlType {
    #[default]
    DropdownList,
    RadioList,
    Checkboxes,
    ColorSquares,
    ImageSquares,
    TextBox,
    MultilineTextbox,
    Datepicker,
    FileUpload,
    ReadonlyCheckboxes,
}

impl AttributeControlType {
    /// Whether the control picks from predefined values rather than free input.
    pub fn should_have_values(self) -> bool {
        match self {
            Self::DropdownList
            | Self::RadioList
            | Self::Checkboxes
            | Self::ColorSquares
            | Self::ImageSquares
            | Self::ReadonlyCheckboxes => true,
            Self::TextBox | Self::MultilineTextbox | Self::Datepicker | Self::FileUpload => false,
        }
    }

    /// Controls that accept at most one value id.
    pub fn is_single_choice(self) -> bool {
        match self {
            Self::DropdownList | Self::RadioList | Self::ColorSquares | Self::ImageSquares => true,
            Self::Checkboxes
            | Self::ReadonlyCheckboxes
            | Self::TextBox
            | Self::MultilineTextbox
            | Self::Datepicker
            | Self::FileUpload => false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductAttributeValue {
    pub id: ValueId,
    pub name: String,
    pub color_rgb: Option<String>,
    pub image_id: Option<String>,
    pub price_adjustment: Decimal,
    /// When set, `price_adjustment` is a percentage of the base price (10 = 10%).
    pub price_adjustment_use_percentage: bool,
    pub weight_adjustment: Decimal,
    pub cost: Decimal,
    pub is_pre_selected: bool,
    pub display_order: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionRequirement {
    pub mapping_id: MappingId,
    pub value_id: ValueId,
}

/// Every requirement must be selected for the owning mapping to be enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCondition {
    pub requirements: Vec<ConditionRequirement>,
}

impl AttributeCondition {
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeValidation {
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub allowed_file_extensions: Vec<String>,
    pub max_file_size_kb: Option<u64>,
    pub default_value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductAttributeMapping {
    pub id: MappingId,
    pub attribute_id: String,
    pub name: String,
    pub control_type: AttributeControlType,
    pub is_required: bool,
    pub show_on_catalog_page: bool,
    pub display_order: i32,
    pub values: Vec<ProductAttributeValue>,
    pub condition: Option<AttributeCondition>,
    pub validation: AttributeValidation,
}

impl ProductAttributeMapping {
    pub fn should_have_values(&self) -> bool {
        self.control_type.should_have_values()
    }

    pub fn value(&self, id: &str) -> Option<&ProductAttributeValue> {
        self.values.iter().find(|value| value.id.0 == id)
    }

    pub fn active_condition(&self) -> Option<&AttributeCondition> {
        self.condition.as_ref().filter(|condition| !condition.is_empty())
    }
}
