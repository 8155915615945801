//! Method label universes
//!
//! A run's outputs are emitted in interleaved order. Viewers that want the
//! sequential order (all primaries first, then all negatives, ...) project
//! the sequential universe onto the labels a run actually produced.


use crate::models::{
    BaseOperator, ImageClass, MaskRun, Postprocess, GRAYSCALE_RETINEX_METHOD,
    KNOWN_RETINEX_METHODS,
};

pub const ORIGINAL_LABEL: &str = "Original";

/// Display ordering of a label universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrder {
    /// Auxiliary slowest, operator fastest
    Sequential,
    /// Operator slowest, auxiliary fastest; the execution order
    Interleaved,
}

impl std::str::FromStr for LabelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "interleaved" | "int" => Ok(Self::Interleaved),
            _ => Err(format!("Unknown label order: {}", s)),
        }
    }
}

/// The three label axes; suffix axes include the empty suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAxes {
    pub operators: Vec<String>,
    pub postprocess: Vec<String>,
    pub auxiliary: Vec<String>,
}

impl LabelAxes {
    /// Every label an image of `class` could receive.
    pub fn for_class(class: ImageClass) -> Self {
        let (operators, postprocess): (Vec<BaseOperator>, Vec<Postprocess>) = match class {
            ImageClass::Color => {
                let mut ops = vec![
                    BaseOperator::Vividness,
                    BaseOperator::Lsv,
                    BaseOperator::AdaptiveContrast,
                ];
                ops.extend(
                    KNOWN_RETINEX_METHODS
                        .iter()
                        .map(|m| BaseOperator::Retinex(m.to_string())),
                );
                (ops, Postprocess::ALL.to_vec())
            }
            ImageClass::Grayscale => (
                vec![
                    BaseOperator::AdaptiveContrast,
                    BaseOperator::Retinex(GRAYSCALE_RETINEX_METHOD.to_string()),
                ],
                vec![Postprocess::Primary, Postprocess::Negative],
            ),
        };

        Self {
            operators: operators.iter().map(BaseOperator::label).collect(),
            postprocess: postprocess.iter().map(|p| p.suffix().to_string()).collect(),
            auxiliary: MaskRun::ALL.iter().map(|m| m.suffix().to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.operators.len() * self.postprocess.len() * self.auxiliary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `"<operator> [<postprocess>] [<auxiliary>]"` with empty parts removed.
pub fn compose_label(operator: &str, postprocess: &str, auxiliary: &str) -> String {
    [operator, postprocess, auxiliary]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `for aux { for post { for op } }`, prefixed with the original.
pub fn sequential(axes: &LabelAxes) -> Vec<String> {
    let mut labels = Vec::with_capacity(axes.len() + 1);
    labels.push(ORIGINAL_LABEL.to_string());
    for aux in &axes.auxiliary {
        for post in &axes.postprocess {
            for op in &axes.operators {
                labels.push(compose_label(op, post, aux));
            }
        }
    }
    labels
}

/// `for op { for post { for aux } }`, prefixed with the original.
pub fn interleaved(axes: &LabelAxes) -> Vec<String> {
    let mut labels = Vec::with_capacity(axes.len() + 1);
    labels.push(ORIGINAL_LABEL.to_string());
    for op in &axes.operators {
        for post in &axes.postprocess {
            for aux in &axes.auxiliary {
                labels.push(compose_label(op, post, aux));
            }
        }
    }
    labels
}

pub fn universe(class: ImageClass, order: LabelOrder) -> Vec<String> {
    let axes = LabelAxes::for_class(class);
    match order {
        LabelOrder::Sequential => sequential(&axes),
        LabelOrder::Interleaved => interleaved(&axes),
    }
}

/// Order-preserving filter of `universe` by membership in `labels`.
pub fn project<S: AsRef<str>>(universe: &[String], labels: &[S]) -> Vec<String> {
    universe
        .iter()
        .filter(|u| labels.iter().any(|l| l.as_ref() == u.as_str()))
        .cloned()
        .collect()
}
