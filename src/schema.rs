//! Input schema declaration and validation.
//!
//! The ten external-facing fields the model consumes, with their numeric
//! types and bounds. Validation walks the whole spec table and reports every
//! offending field, so a client sees all problems in one 422 round trip.

use serde::Serialize;
use serde_json::Value;

use crate::error::FieldError;

/// One validated employee feature vector, external field names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputRecord {
    pub ratio_surcharge_anciennete: f64,
    pub nombre_participation_pee: i64,
    /// 1.0 si divorcé(e), 0.0 sinon
    pub statut_marital_divorce: f64,
    pub age: i64,
    pub annees_dans_l_entreprise: i64,
    /// 1.0 si déplacements fréquents, 0.0 sinon
    pub frequence_deplacement_frequent: f64,
    /// 1.0 si Représentant Commercial, 0.0 sinon
    pub poste_representant_commercial: f64,
    /// Niveau 1-5
    pub niveau_education: i64,
    /// 1.0 si Marketing, 0.0 sinon
    pub domaine_etude_marketing: f64,
    /// 1.0 si Consultant, 0.0 sinon
    pub poste_consultant: f64,
}

enum FieldKind {
    Float,
    Int {
        min: Option<i64>,
        max: Option<i64>,
    },
}

struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
}

/// The ten mandatory fields, in declaration order. No field has a default.
const FIELDS: [FieldSpec; 10] = [
    FieldSpec {
        name: "ratio_surcharge_anciennete",
        kind: FieldKind::Float,
    },
    FieldSpec {
        name: "nombre_participation_pee",
        kind: FieldKind::Int {
            min: None,
            max: None,
        },
    },
    FieldSpec {
        name: "statut_marital_divorce",
        kind: FieldKind::Float,
    },
    FieldSpec {
        name: "age",
        kind: FieldKind::Int {
            min: Some(18),
            max: Some(100),
        },
    },
    FieldSpec {
        name: "annees_dans_l_entreprise",
        kind: FieldKind::Int {
            min: Some(0),
            max: None,
        },
    },
    FieldSpec {
        name: "frequence_deplacement_frequent",
        kind: FieldKind::Float,
    },
    FieldSpec {
        name: "poste_representant_commercial",
        kind: FieldKind::Float,
    },
    FieldSpec {
        name: "niveau_education",
        kind: FieldKind::Int {
            min: Some(1),
            max: Some(5),
        },
    },
    FieldSpec {
        name: "domaine_etude_marketing",
        kind: FieldKind::Float,
    },
    FieldSpec {
        name: "poste_consultant",
        kind: FieldKind::Float,
    },
];

/// Accept JSON integers and floats with a zero fractional part.
/// The float must also fit in an `i64`; the cast must not saturate.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    value
        .as_f64()
        .filter(|f| {
            f.is_finite()
                && f.fract() == 0.0
                && *f >= i64::MIN as f64
                && *f < i64::MAX as f64
        })
        .map(|f| f as i64)
}

fn bounds_message(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(a), Some(b)) => format!("doit être compris entre {a} et {b}"),
        (Some(a), None) => format!("doit être supérieur ou égal à {a}"),
        (None, Some(b)) => format!("doit être inférieur ou égal à {b}"),
        (None, None) => String::new(),
    }
}

/// Validate a raw payload against the input schema.
///
/// Returns the typed record, or every field-level violation at once.
/// Extra fields are ignored; a non-object payload is a single root error.
pub fn validate(payload: &Value) -> Result<InputRecord, Vec<FieldError>> {
    let Some(object) = payload.as_object() else {
        return Err(vec![FieldError::new("__root__", "un objet JSON est attendu")]);
    };

    let mut errors = Vec::new();
    let mut values = [0f64; 10];

    for (i, spec) in FIELDS.iter().enumerate() {
        let value = match object.get(spec.name) {
            None | Some(Value::Null) => {
                errors.push(FieldError::new(spec.name, "champ requis"));
                continue;
            }
            Some(value) => value,
        };

        match spec.kind {
            FieldKind::Float => match value.as_f64() {
                Some(v) => values[i] = v,
                None => errors.push(FieldError::new(spec.name, "nombre attendu")),
            },
            FieldKind::Int { min, max } => match as_integer(value) {
                Some(v) => {
                    if min.is_some_and(|m| v < m) || max.is_some_and(|m| v > m) {
                        errors.push(FieldError::new(spec.name, bounds_message(min, max)));
                    } else {
                        values[i] = v as f64;
                    }
                }
                None => errors.push(FieldError::new(spec.name, "entier attendu")),
            },
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(InputRecord {
        ratio_surcharge_anciennete: values[0],
        nombre_participation_pee: values[1] as i64,
        statut_marital_divorce: values[2],
        age: values[3] as i64,
        annees_dans_l_entreprise: values[4] as i64,
        frequence_deplacement_frequent: values[5],
        poste_representant_commercial: values[6],
        niveau_education: values[7] as i64,
        domaine_etude_marketing: values[8],
        poste_consultant: values[9],
    })
}
