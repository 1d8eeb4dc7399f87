use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    #[serde(deserialize_with = "null_as_empty")]
    pub address_line1: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub address_line2: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub state_province: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub postal_code: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub country_code: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub country: String,
}

/// 模型讀不到的欄位常回傳 `null`，視同空字串
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Address {
    pub fn is_empty(&self) -> bool {
        [
            &self.address_line1,
            &self.address_line2,
            &self.city,
            &self.state_province,
            &self.postal_code,
            &self.country_code,
            &self.country,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

/// 包裹地址的角色標記，承運商回傳的未知標記原樣保留
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AddressRole {
    Origin,
    Destination,
    Other(String),
}

impl From<String> for AddressRole {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ORIGIN" => AddressRole::Origin,
            "DESTINATION" => AddressRole::Destination,
            _ => AddressRole::Other(value),
        }
    }
}

impl From<AddressRole> for String {
    fn from(role: AddressRole) -> Self {
        match role {
            AddressRole::Origin => "ORIGIN".to_string(),
            AddressRole::Destination => "DESTINATION".to_string(),
            AddressRole::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageAddress {
    #[serde(rename = "type")]
    pub role: AddressRole,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attention_name: String,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingDetails {
    #[serde(default)]
    pub track_response: TrackResponse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackResponse {
    #[serde(default)]
    pub shipment: Vec<Shipment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shipment {
    pub inquiry_number: String,
    pub shipment_type: String,
    pub shipper_number: String,
    pub pickup_date: String,
    pub package: Vec<Package>,
    pub user_relation: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Package {
    pub tracking_number: String,
    pub package_address: Vec<PackageAddress>,
}

impl TrackingDetails {
    /// 依 shipment → package → address 順序尋找第一個符合角色的地址
    pub fn package_address(&self, role: &AddressRole) -> Option<&PackageAddress> {
        self.track_response
            .shipment
            .iter()
            .flat_map(|shipment| shipment.package.iter())
            .flat_map(|package| package.package_address.iter())
            .find(|address| &address.role == role)
    }

    pub fn destination_address(&self) -> Option<&PackageAddress> {
        self.package_address(&AddressRole::Destination)
    }
}

/// The address field as a model may emit it: a structured object, or a
/// single free-form line when it could not split the label into parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScannedAddressField {
    Structured(Address),
    Line(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPromptResult {
    #[serde(flatten)]
    fields: Address,
    #[serde(default)]
    address: Option<ScannedAddressField>,
    #[serde(default)]
    tracking_number: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// 模型從標籤圖片讀出的內容，來源不可信任
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptResult {
    pub address: Address,
    pub tracking_number: Option<String>,
    pub error: Option<String>,
}

impl<'de> Deserialize<'de> for PromptResult {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawPromptResult::deserialize(deserializer)?;
        let address = match raw.address {
            Some(ScannedAddressField::Structured(address)) => address,
            Some(ScannedAddressField::Line(line)) => Address {
                address_line1: line,
                ..Address::default()
            },
            None => raw.fields,
        };

        Ok(PromptResult {
            address,
            tracking_number: raw.tracking_number.filter(|n| !n.trim().is_empty()),
            error: raw.error.filter(|e| !e.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub scanned_address: Address,
    pub expected_address: PackageAddress,
    pub valid: bool,
}
