//! Feature mapping: external field names to training-time column order.
//!
//! The model was trained on column names carrying accents and spaces; the
//! API exposes ASCII snake_case aliases. Mapping renames the five aliased
//! columns and reorders all ten to the exact order the artifact was trained
//! on. A wrong order silently corrupts predictions, so the order is asserted
//! against the artifact feature list, never assumed.

use crate::schema::InputRecord;

/// External name -> training-time name, for the five one-hot columns whose
/// training names are not valid ASCII identifiers.
pub const RENAME_TABLE: [(&str, &str); 5] = [
    ("statut_marital_divorce", "statut_marital_Divorcé(e)"),
    ("frequence_deplacement_frequent", "frequence_deplacement_Frequent"),
    ("poste_representant_commercial", "poste_Représentant Commercial"),
    ("domaine_etude_marketing", "domaine_etude_Marketing"),
    ("poste_consultant", "poste_Consultant"),
];

/// Column order the light model was trained on. Used when the artifact
/// carries no feature list of its own.
pub const TRAINING_COLUMNS: [&str; 10] = [
    "ratio_surcharge_anciennete",
    "nombre_participation_pee",
    "statut_marital_Divorcé(e)",
    "age",
    "annees_dans_l_entreprise",
    "frequence_deplacement_Frequent",
    "poste_Représentant Commercial",
    "niveau_education",
    "domaine_etude_Marketing",
    "poste_Consultant",
];

/// The ten values renamed and ordered exactly as the model expects them.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedFeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl MappedFeatureVector {
    /// Training-time column names, in vector order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Feature values, aligned with [`columns`](Self::columns).
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// The artifact feature list is inconsistent with this mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapError(pub String);

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn internal_name(external: &str) -> &str {
    RENAME_TABLE
        .iter()
        .find(|(ext, _)| *ext == external)
        .map(|(_, internal)| *internal)
        .unwrap_or(external)
}

/// (external name, value) pairs in declaration order.
fn external_pairs(record: &InputRecord) -> [(&'static str, f64); 10] {
    [
        ("ratio_surcharge_anciennete", record.ratio_surcharge_anciennete),
        ("nombre_participation_pee", record.nombre_participation_pee as f64),
        ("statut_marital_divorce", record.statut_marital_divorce),
        ("age", record.age as f64),
        ("annees_dans_l_entreprise", record.annees_dans_l_entreprise as f64),
        (
            "frequence_deplacement_frequent",
            record.frequence_deplacement_frequent,
        ),
        (
            "poste_representant_commercial",
            record.poste_representant_commercial,
        ),
        ("niveau_education", record.niveau_education as f64),
        ("domaine_etude_marketing", record.domaine_etude_marketing),
        ("poste_consultant", record.poste_consultant),
    ]
}

/// Rename and reorder a validated record into the model's column order.
///
/// Pure and total over any validated input: with `expected` empty the
/// canonical [`TRAINING_COLUMNS`] order applies and the function cannot fail.
/// A non-empty `expected` that names a column this mapper does not produce,
/// or with the wrong column count, is a configuration mismatch between the
/// artifact and the mapper.
pub fn map_features(
    record: &InputRecord,
    expected: &[String],
) -> Result<MappedFeatureVector, MapError> {
    let pairs = external_pairs(record);

    let order: Vec<&str> = if expected.is_empty() {
        TRAINING_COLUMNS.to_vec()
    } else {
        if expected.len() != pairs.len() {
            return Err(MapError(format!(
                "le modèle attend {} colonnes, le mapper en produit {}",
                expected.len(),
                pairs.len()
            )));
        }
        expected.iter().map(String::as_str).collect()
    };

    let mut columns = Vec::with_capacity(order.len());
    let mut values = Vec::with_capacity(order.len());

    for name in order {
        let found = pairs
            .iter()
            .find(|(external, _)| internal_name(external) == name);
        match found {
            Some((_, value)) => {
                columns.push(name.to_string());
                values.push(*value);
            }
            None => {
                return Err(MapError(format!("colonne inconnue du mapper : {name}")));
            }
        }
    }

    Ok(MappedFeatureVector { columns, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InputRecord {
        InputRecord {
            ratio_surcharge_anciennete: 0.14,
            nombre_participation_pee: 0,
            statut_marital_divorce: 1.0,
            age: 28,
            annees_dans_l_entreprise: 1,
            frequence_deplacement_frequent: 1.0,
            poste_representant_commercial: 1.0,
            niveau_education: 2,
            domaine_etude_marketing: 0.0,
            poste_consultant: 0.0,
        }
    }

    #[test]
    fn maps_to_canonical_order_when_artifact_has_no_feature_list() {
        let vector = map_features(&record(), &[]).unwrap();
        let columns: Vec<&str> = vector.columns().iter().map(String::as_str).collect();
        assert_eq!(columns, TRAINING_COLUMNS);
        assert_eq!(
            vector.values().to_vec(),
            vec![0.14, 0.0, 1.0, 28.0, 1.0, 1.0, 1.0, 2.0, 0.0, 0.0]
        );
    }

    #[test]
    fn applies_every_rename() {
        let vector = map_features(&record(), &[]).unwrap();
        for (external, internal) in RENAME_TABLE {
            assert!(!vector.columns().iter().any(|c| c == external));
            assert!(vector.columns().iter().any(|c| c == internal), "{internal}");
        }
    }

    #[test]
    fn follows_the_artifact_order_exactly() {
        let mut expected: Vec<String> =
            TRAINING_COLUMNS.iter().map(|c| c.to_string()).collect();
        expected.reverse();

        let vector = map_features(&record(), &expected).unwrap();
        assert_eq!(vector.columns(), expected.as_slice());
        // age moved to position 6 in the reversed order
        assert_eq!(vector.values()[6], 28.0);
    }

    #[test]
    fn unknown_expected_column_is_a_configuration_error() {
        let mut expected: Vec<String> =
            TRAINING_COLUMNS.iter().map(|c| c.to_string()).collect();
        expected[3] = "salaire_annuel".to_string();

        let err = map_features(&record(), &expected).unwrap_err();
        assert!(err.0.contains("salaire_annuel"));
    }

    #[test]
    fn wrong_column_count_is_a_configuration_error() {
        let expected = vec!["age".to_string()];
        let err = map_features(&record(), &expected).unwrap_err();
        assert!(err.0.contains("1 colonnes"));
    }
}
