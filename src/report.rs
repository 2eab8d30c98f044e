//! Flat key-value report of a transit fit

use crate::error::{EpochSubset, TransitFitError};
use crate::mode::{EpochParity, FitMode};
use crate::significance::EpochScores;
use crate::summary::PosteriorSummary;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CardValue {
    Float(f64),
    Bool(bool),
}

impl From<f64> for CardValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CardValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Named value with a human-readable comment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportCard {
    pub key: String,
    pub value: CardValue,
    pub comment: String,
}

/// Cards of a single fit mode, keys are prefixed with `TF` and the mode tag, e.g. `TFA_T0`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub title: String,
    pub cards: Vec<ReportCard>,
}

impl Report {
    fn push(&mut self, key: String, value: impl Into<CardValue>, comment: &str) {
        self.cards.push(ReportCard {
            key,
            value: value.into(),
            comment: comment.to_owned(),
        });
    }

    pub fn get(&self, key: &str) -> Option<CardValue> {
        self.cards.iter().find(|c| c.key == key).map(|c| c.value)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Build the report of a `mode` fit
    ///
    /// `delta_bic` is reported for the `all` mode only, as are the mean scores of the even and the
    /// odd epochs. An empty parity subset is an error.
    pub fn new(
        mode: FitMode,
        title: impl Into<String>,
        summary: &PosteriorSummary,
        scores: &EpochScores,
        delta_bic: Option<f64>,
    ) -> Result<Self, TransitFitError> {
        let c = mode.tag();
        let key = |name: &str| format!("TF{c}_{name}");
        let mut report = Self {
            title: title.into(),
            cards: vec![],
        };

        const ESTIMATES: [(&str, &str, &str, &str); 10] = [
            ("T0", "tc", "Transit centre [BJD]", "Transit centre uncertainty [d]"),
            ("PR", "p", "Orbital period [d]", "Orbital period uncertainty [d]"),
            (
                "RHO",
                "rho",
                "Stellar density [g/cm^3]",
                "Stellar density uncertainty [g/cm^3]",
            ),
            ("B", "b", "Impact parameter", "Impact parameter uncertainty"),
            ("AR", "k2", "Area ratio", "Area ratio uncertainty"),
            ("SC", "c_sin", "Sine phase", "Sine phase uncertainty"),
            ("SA", "a_sin_0", "Sine amplitude", "Sine amplitude uncertainty"),
            ("RR", "k", "Radius ratio", "Radius ratio uncertainty"),
            ("A", "a", "Semi-major axis", "Semi-major axis uncertainty"),
            (
                "T14",
                "t14",
                "Transit duration T14 [d]",
                "Transit duration T14 uncertainty [d]",
            ),
        ];
        for (card, parameter, comment, err_comment) in ESTIMATES {
            let estimate = summary.get(parameter)?;
            report.push(key(card), estimate.med, comment);
            report.push(key(&format!("{card}E")), estimate.err, err_comment);
        }

        let t14 = summary.get("t14")?;
        let t23 = summary.get("t23")?;
        let (t23_med, t23_err, ratio) = if t23.is_finite() {
            (t23.med, t23.err, t23.med / t14.med)
        } else {
            tracing::warn!(mode = %mode, "T23 is undefined, reporting zero");
            (0.0, 0.0, 0.0)
        };
        report.push(key("T23"), t23_med, "Transit duration T23 [d]");
        report.push(key("T23E"), t23_err, "Transit duration T23 uncertainty [d]");
        report.push(key("TDR"), ratio, "T23 to T14 ratio");
        report.push(
            key("WN"),
            10f64.powf(summary.get("wn_loge_0")?.med),
            "White noise std",
        );
        report.push(key("GRAZ"), summary.is_grazing()?, "Is the transit grazing");
        report.push(
            key("DLLA"),
            scores.mean(EpochSubset::All)?,
            "Mean per-orbit delta log likelihood",
        );

        if mode == FitMode::All {
            report.push(
                key("DLLE"),
                scores.mean(EpochSubset::Parity(EpochParity::Even))?,
                "Mean per-orbit delta log likelihood (even)",
            );
            report.push(
                key("DLLO"),
                scores.mean(EpochSubset::Parity(EpochParity::Odd))?,
                "Mean per-orbit delta log likelihood (odd)",
            );
            if let Some(dbic) = delta_bic {
                report.push(key("DBIC"), dbic, "Delta BIC of transit and flat models");
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::ParameterEstimate;

    use approx::assert_relative_eq;
    use ndarray::array;

    fn summary(t23: f64) -> PosteriorSummary {
        let estimate = |med, err| ParameterEstimate { med, err };
        PosteriorSummary::new(vec![
            ("tc".into(), estimate(2.0, 0.001)),
            ("p".into(), estimate(3.5, 0.0001)),
            ("rho".into(), estimate(1.4, 0.1)),
            ("b".into(), estimate(0.3, 0.1)),
            ("k2".into(), estimate(0.01, 0.001)),
            ("wn_loge_0".into(), estimate(-3.0, 0.01)),
            ("c_sin".into(), estimate(0.5, 0.2)),
            ("a_sin_0".into(), estimate(1e-4, 1e-4)),
            ("k".into(), estimate(0.1, 0.005)),
            ("a".into(), estimate(9.7, 0.3)),
            ("t14".into(), estimate(0.12, 0.002)),
            ("t23".into(), estimate(t23, 0.002)),
        ])
    }

    fn scores() -> EpochScores {
        let epochs = array![0, 0, 1, 2];
        let observed = array![0.99, 1.0, 0.99, 0.99];
        EpochScores::score(epochs.view(), observed.view(), observed.view(), 1e-3).unwrap()
    }

    #[test]
    fn all_mode_cards() {
        let report = Report::new(FitMode::All, "Transit fit", &summary(0.1), &scores(), Some(-12.0))
            .unwrap();
        assert_eq!(report.title, "Transit fit");
        assert_eq!(report.cards[0].key, "TFA_T0");
        assert_eq!(report.get("TFA_PRE"), Some(CardValue::Float(0.0001)));
        assert_eq!(report.get("TFA_GRAZ"), Some(CardValue::Bool(false)));
        assert_eq!(report.get("TFA_DBIC"), Some(CardValue::Float(-12.0)));
        let Some(CardValue::Float(ratio)) = report.get("TFA_TDR") else {
            panic!("TDR must be a float");
        };
        assert_relative_eq!(ratio, 0.1 / 0.12);
        let Some(CardValue::Float(wn)) = report.get("TFA_WN") else {
            panic!("WN must be a float");
        };
        assert_relative_eq!(wn, 1e-3);
        assert!(report.get("TFA_DLLE").is_some());
        assert!(report.get("TFA_DLLO").is_some());
    }

    #[test]
    fn parity_mode_has_no_split() {
        let report =
            Report::new(FitMode::Odd, "Odd transits", &summary(0.1), &scores(), None).unwrap();
        assert!(report.cards.iter().all(|c| c.key.starts_with("TFO_")));
        assert!(report.get("TFO_DLLA").is_some());
        assert_eq!(report.get("TFO_DLLE"), None);
        assert_eq!(report.get("TFO_DBIC"), None);
    }

    #[test]
    fn undefined_t23_is_zero() {
        let report =
            Report::new(FitMode::Even, "Even transits", &summary(f64::NAN), &scores(), None)
                .unwrap();
        assert_eq!(report.get("TFE_T23"), Some(CardValue::Float(0.0)));
        assert_eq!(report.get("TFE_TDR"), Some(CardValue::Float(0.0)));
    }

    #[test]
    fn missing_parity_fails() {
        let epochs = array![0, 2];
        let observed = array![0.99, 0.99];
        let even_only =
            EpochScores::score(epochs.view(), observed.view(), observed.view(), 1e-3).unwrap();
        let err = Report::new(FitMode::All, "", &summary(0.1), &even_only, None).unwrap_err();
        assert_eq!(
            err,
            TransitFitError::EmptyEpochSubset(EpochSubset::Parity(EpochParity::Odd))
        );
    }

    #[test]
    fn serializes_to_json() {
        let report =
            Report::new(FitMode::Odd, "Odd transits", &summary(0.1), &scores(), None).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cards"][0]["key"], "TFO_T0");
        assert_eq!(json["cards"][0]["value"], 2.0);
    }
}
