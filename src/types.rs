//! Core types for the WeGene assistant

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sex code WeGene uses for male profiles
pub const GENDER_MALE: &str = "1";
/// Sex code WeGene uses for female profiles
pub const GENDER_FEMALE: &str = "2";

/// One genetic test result set under a WeGene account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Raw sex code as text ("1" male, "2" female, anything else unknown)
    pub gender: String,
    pub profile_id: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        gender: impl Into<String>,
        profile_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            gender: gender.into(),
            profile_id: profile_id.into(),
        }
    }
}

/// Report category as used in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportCategory {
    #[serde(rename = "健康风险")]
    HealthRisk,
    #[serde(rename = "遗传特征")]
    InheritedTraits,
    #[serde(rename = "遗传性疾病")]
    InheritedDiseases,
    #[serde(rename = "营养代谢")]
    NutritionMetabolism,
    #[serde(rename = "药物指南")]
    DrugGuide,
    #[serde(rename = "运动基因")]
    Athletigen,
    #[serde(rename = "皮肤特性")]
    Skin,
    #[serde(rename = "心理特质")]
    Psychology,
}

impl ReportCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::HealthRisk => "健康风险",
            ReportCategory::InheritedTraits => "遗传特征",
            ReportCategory::InheritedDiseases => "遗传性疾病",
            ReportCategory::NutritionMetabolism => "营养代谢",
            ReportCategory::DrugGuide => "药物指南",
            ReportCategory::Athletigen => "运动基因",
            ReportCategory::Skin => "皮肤特性",
            ReportCategory::Psychology => "心理特质",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which profiles a report applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenderApplicability {
    #[serde(rename = "全部")]
    All,
    #[serde(rename = "男")]
    MaleOnly,
    #[serde(rename = "女")]
    FemaleOnly,
}

impl GenderApplicability {
    /// Male-only reports are hidden from female profiles and vice versa.
    /// Unknown sex codes see everything.
    pub fn applies_to(&self, gender: &str) -> bool {
        match self {
            GenderApplicability::All => true,
            GenderApplicability::MaleOnly => gender != GENDER_FEMALE,
            GenderApplicability::FemaleOnly => gender != GENDER_MALE,
        }
    }
}

/// One entry of the report catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub category: ReportCategory,
    pub report_id: String,
    pub report_name: String,
    pub report_gender_category: GenderApplicability,
    pub report_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_result: Option<String>,
}

impl ReportDefinition {
    pub fn applies_to(&self, profile: &Profile) -> bool {
        self.report_gender_category.applies_to(&profile.gender)
    }
}

/// Arguments of the wegene-get-report tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GetReportParams {
    /// The endpoint of the report
    pub report_endpoint: String,
    /// The ID of the report
    pub report_id: String,
    /// The ID of the profile
    pub profile_id: String,
}
