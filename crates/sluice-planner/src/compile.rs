//! Op key resolution and plan shape checks.

use serde::de::DeserializeOwned;
use sluice_core::config::EngineConfig;
use sluice_io::csv::{CsvDecodeOptions, CsvEncodeOptions, DECODE_OP, ENCODE_OP};
use sluice_operators::filter::FilterArgs;
use sluice_operators::head::HeadArgs;
use sluice_operators::rename::RenameArgs;
use sluice_operators::sample::SampleArgs;
use sluice_operators::select::SelectArgs;
use sluice_operators::skip::SkipArgs;
use sluice_operators::sort::SortArgs;
use sluice_operators::stats::StatsArgs;

use crate::error::PlanError;
use crate::plan::{Plan, PlanStep};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderSpec {
    Csv(CsvDecodeOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderSpec {
    Csv(CsvEncodeOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepSpec {
    Stats(StatsArgs),
    Filter(FilterArgs),
    Select(SelectArgs),
    Rename(RenameArgs),
    Head(HeadArgs),
    Skip(SkipArgs),
    Sort(SortArgs),
    Sample(SampleArgs),
}

impl StepSpec {
    pub fn op(&self) -> &'static str {
        match self {
            StepSpec::Stats(_) => "stats",
            StepSpec::Filter(_) => "filter",
            StepSpec::Select(_) => "select",
            StepSpec::Rename(_) => "rename",
            StepSpec::Head(_) => "head",
            StepSpec::Skip(_) => "skip",
            StepSpec::Sort(_) => "sort",
            StepSpec::Sample(_) => "sample",
        }
    }
}

/// Decoder, transform steps in order, encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPlan {
    pub config: Option<EngineConfig>,
    pub decoder: DecoderSpec,
    pub steps: Vec<StepSpec>,
    pub encoder: EncoderSpec,
}

enum Resolved {
    Decoder(DecoderSpec),
    Encoder(EncoderSpec),
    Step(StepSpec),
}

/// Missing args behave like an empty object.
fn args<T: DeserializeOwned>(step: &PlanStep) -> Result<T, PlanError> {
    let value = match &step.args {
        serde_json::Value::Null => serde_json::Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(value).map_err(|e| PlanError::InvalidArgs {
        op: step.op.clone(),
        reason: e.to_string(),
    })
}

fn resolve(step: &PlanStep) -> Result<Resolved, PlanError> {
    Ok(match step.op.as_str() {
        DECODE_OP => Resolved::Decoder(DecoderSpec::Csv(args(step)?)),
        ENCODE_OP => Resolved::Encoder(EncoderSpec::Csv(args(step)?)),
        "stats" => Resolved::Step(StepSpec::Stats(args(step)?)),
        "filter" => Resolved::Step(StepSpec::Filter(args(step)?)),
        "select" => Resolved::Step(StepSpec::Select(args(step)?)),
        "rename" => Resolved::Step(StepSpec::Rename(args(step)?)),
        "head" => Resolved::Step(StepSpec::Head(args(step)?)),
        "skip" => Resolved::Step(StepSpec::Skip(args(step)?)),
        "sort" => Resolved::Step(StepSpec::Sort(args(step)?)),
        "sample" => Resolved::Step(StepSpec::Sample(args(step)?)),
        other => return Err(PlanError::UnknownOp(other.to_string())),
    })
}

pub fn compile(plan: &Plan) -> Result<CompiledPlan, PlanError> {
    if plan.steps.is_empty() {
        return Err(PlanError::Empty);
    }

    let mut decoder: Option<(usize, DecoderSpec)> = None;
    let mut encoder: Option<(usize, EncoderSpec)> = None;
    let mut steps = Vec::new();

    for (i, step) in plan.steps.iter().enumerate() {
        match resolve(step)? {
            Resolved::Decoder(d) => {
                if decoder.is_some() {
                    return Err(PlanError::MultipleDecoders);
                }
                decoder = Some((i, d));
            }
            Resolved::Encoder(e) => {
                if encoder.is_some() {
                    return Err(PlanError::MultipleEncoders);
                }
                encoder = Some((i, e));
            }
            Resolved::Step(s) => steps.push(s),
        }
    }

    let (decoder_pos, decoder) = decoder.ok_or(PlanError::NoDecoder)?;
    let (encoder_pos, encoder) = encoder.ok_or(PlanError::NoEncoder)?;
    if decoder_pos != 0 {
        return Err(PlanError::DecoderNotFirst);
    }
    if encoder_pos != plan.steps.len() - 1 {
        return Err(PlanError::EncoderNotLast);
    }

    Ok(CompiledPlan {
        config: plan.config.clone(),
        decoder,
        steps,
        encoder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan(steps: &[(&str, serde_json::Value)]) -> Plan {
        Plan {
            config: None,
            steps: steps
                .iter()
                .map(|(op, args)| PlanStep::new(*op, args.clone()))
                .collect(),
        }
    }

    #[test]
    fn identity_plan_compiles_with_defaults() {
        let compiled = compile(&plan(&[
            ("codec.csv.decode", json!(null)),
            ("codec.csv.encode", json!(null)),
        ]))
        .unwrap();
        assert_eq!(compiled.decoder, DecoderSpec::Csv(CsvDecodeOptions::default()));
        assert!(compiled.steps.is_empty());
    }

    #[test]
    fn steps_keep_their_order() {
        let compiled = compile(&plan(&[
            ("codec.csv.decode", json!({})),
            ("filter", json!({"expr": "a > 1"})),
            ("head", json!({"n": 3})),
            ("codec.csv.encode", json!({})),
        ]))
        .unwrap();
        let ops: Vec<&str> = compiled.steps.iter().map(StepSpec::op).collect();
        assert_eq!(ops, ["filter", "head"]);
    }

    #[test]
    fn shape_errors() {
        let dec = ("codec.csv.decode", json!({}));
        let enc = ("codec.csv.encode", json!({}));
        let stats = ("stats", json!({}));
        assert_eq!(compile(&plan(&[])), Err(PlanError::Empty));
        assert_eq!(
            compile(&plan(&[dec.clone(), dec.clone(), enc.clone()])),
            Err(PlanError::MultipleDecoders)
        );
        assert_eq!(
            compile(&plan(&[dec.clone(), enc.clone(), enc.clone()])),
            Err(PlanError::MultipleEncoders)
        );
        assert_eq!(compile(&plan(&[dec.clone()])), Err(PlanError::NoEncoder));
        assert_eq!(compile(&plan(&[enc.clone()])), Err(PlanError::NoDecoder));
        assert_eq!(
            compile(&plan(&[stats.clone(), dec.clone(), enc.clone()])),
            Err(PlanError::DecoderNotFirst)
        );
        assert_eq!(
            compile(&plan(&[dec, enc, stats])),
            Err(PlanError::EncoderNotLast)
        );
    }

    #[test]
    fn unknown_op_and_bad_args() {
        let err = compile(&plan(&[("explode", json!({}))])).unwrap_err();
        assert_eq!(err.to_string(), "unknown op: 'explode'");

        let err = compile(&plan(&[
            ("codec.csv.decode", json!({})),
            ("stats", json!({"stats": ["mode"]})),
            ("codec.csv.encode", json!({})),
        ]))
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid args for 'stats': "));

        let err = compile(&plan(&[("filter", json!({}))])).unwrap_err();
        assert!(matches!(err, PlanError::InvalidArgs { .. }));
    }
}
