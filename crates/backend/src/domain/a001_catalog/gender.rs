use contracts::domain::a001_catalog::Gender;

use crate::shared::config::GenderConfig;

/// Таблица синонимов пола.
///
/// Сравнение по подстроке без учета регистра. Порядок проверки:
/// унисекс, женский, мужской; первое совпадение побеждает.
#[derive(Debug, Clone)]
pub struct GenderNormalizer {
    rules: Vec<(Gender, Vec<String>)>,
}

impl GenderNormalizer {
    pub fn new(config: &GenderConfig) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            rules: vec![
                (Gender::Unisex, lower(&config.unisex)),
                (Gender::Female, lower(&config.female)),
                (Gender::Male, lower(&config.male)),
            ],
        }
    }

    pub fn normalize(&self, label: Option<&str>) -> Gender {
        let Some(label) = label.map(|l| l.trim().to_lowercase()) else {
            return Gender::Unisex;
        };
        if label.is_empty() {
            return Gender::Unisex;
        }

        self.rules
            .iter()
            .find(|(_, synonyms)| synonyms.iter().any(|s| label.contains(s.as_str())))
            .map(|(gender, _)| *gender)
            .unwrap_or(Gender::Unisex)
    }
}

impl Default for GenderNormalizer {
    fn default() -> Self {
        Self::new(&GenderConfig::default())
    }
}
