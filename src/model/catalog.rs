//! Document catalog
//!
//! The fixed set of certificates and permits a resident can request, each with
//! its own optional extra form fields.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of input an extra field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// An extra form field attached to a document type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn text(name: &'static str, label: &'static str, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Text,
        required,
    }
}

const fn number(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Number,
        required: false,
    }
}

/// Requestable document kinds, serialized by their display name
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentType {
    #[default]
    #[serde(rename = "Barangay Clearance")]
    BarangayClearance,
    #[serde(rename = "Certificate of Residency")]
    Residency,
    #[serde(rename = "Certificate of Indigency")]
    Indigency,
    #[serde(rename = "Good Moral Certificate")]
    GoodMoral,
    #[serde(rename = "Business Permit")]
    BusinessPermit,
    #[serde(rename = "Certificate of Death")]
    Death,
    #[serde(rename = "Certificate for PWD")]
    Pwd,
    #[serde(rename = "Certificate of Vaccination")]
    Vaccination,
    #[serde(rename = "Certificate of Appearance")]
    Appearance,
    #[serde(rename = "Certificate for Achiever")]
    Achiever,
    #[serde(rename = "First Time Jobseeker Oath")]
    FirstTimeJobseeker,
    #[serde(rename = "Certificate of Live-In")]
    LiveIn,
}

impl DocumentType {
    /// Get all document types for iteration
    pub fn all() -> &'static [DocumentType] {
        &[
            DocumentType::BarangayClearance,
            DocumentType::Residency,
            DocumentType::Indigency,
            DocumentType::GoodMoral,
            DocumentType::BusinessPermit,
            DocumentType::Death,
            DocumentType::Pwd,
            DocumentType::Vaccination,
            DocumentType::Appearance,
            DocumentType::Achiever,
            DocumentType::FirstTimeJobseeker,
            DocumentType::LiveIn,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentType::BarangayClearance => "Barangay Clearance",
            DocumentType::Residency => "Certificate of Residency",
            DocumentType::Indigency => "Certificate of Indigency",
            DocumentType::GoodMoral => "Good Moral Certificate",
            DocumentType::BusinessPermit => "Business Permit",
            DocumentType::Death => "Certificate of Death",
            DocumentType::Pwd => "Certificate for PWD",
            DocumentType::Vaccination => "Certificate of Vaccination",
            DocumentType::Appearance => "Certificate of Appearance",
            DocumentType::Achiever => "Certificate for Achiever",
            DocumentType::FirstTimeJobseeker => "First Time Jobseeker Oath",
            DocumentType::LiveIn => "Certificate of Live-In",
        }
    }

    /// Extra fields the request form shows for this type
    pub fn extra_fields(&self) -> &'static [FieldSpec] {
        match self {
            DocumentType::BarangayClearance => CLEARANCE_FIELDS,
            DocumentType::Residency => RESIDENCY_FIELDS,
            DocumentType::Indigency => INDIGENCY_FIELDS,
            DocumentType::GoodMoral => GOOD_MORAL_FIELDS,
            DocumentType::BusinessPermit => BUSINESS_PERMIT_FIELDS,
            DocumentType::Death => DEATH_FIELDS,
            DocumentType::Pwd => PWD_FIELDS,
            DocumentType::Vaccination => VACCINATION_FIELDS,
            DocumentType::Appearance => APPEARANCE_FIELDS,
            DocumentType::Achiever => ACHIEVER_FIELDS,
            DocumentType::FirstTimeJobseeker => JOBSEEKER_FIELDS,
            DocumentType::LiveIn => LIVE_IN_FIELDS,
        }
    }
}

const CLEARANCE_FIELDS: &[FieldSpec] = &[text("purpose", "Purpose", true)];
const RESIDENCY_FIELDS: &[FieldSpec] = &[number("years_resided", "Years of Residency")];
const INDIGENCY_FIELDS: &[FieldSpec] = &[number("household_income", "Household Monthly Income")];
const GOOD_MORAL_FIELDS: &[FieldSpec] = &[text("school", "School / Employer", false)];
const BUSINESS_PERMIT_FIELDS: &[FieldSpec] = &[
    text("business_name", "Business Name", true),
    text("business_address", "Business Address", true),
    text("business_owner", "Owner's Full Name", true),
    text("business_type", "Type of Business", false),
    text(
        "business_registration",
        "Business Registration / DTI Number",
        false,
    ),
];
const DEATH_FIELDS: &[FieldSpec] = &[text("deceased_name", "Deceased Name", true)];
const PWD_FIELDS: &[FieldSpec] = &[text("disability_type", "Type of Disability", false)];
const VACCINATION_FIELDS: &[FieldSpec] = &[text("vaccine_type", "Vaccine Type", false)];
const APPEARANCE_FIELDS: &[FieldSpec] = &[text("purpose", "Purpose", false)];
const ACHIEVER_FIELDS: &[FieldSpec] = &[text("achievement", "Achievement Details", false)];
const JOBSEEKER_FIELDS: &[FieldSpec] = &[text("school_graduated", "School Graduated From", false)];
const LIVE_IN_FIELDS: &[FieldSpec] = &[text("partner_name", "Partner Name", false)];

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    /// Parse a display name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DocumentType::all()
            .iter()
            .find(|t| t.display_name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| format!("Unknown document type: {}", wanted))
    }
}
