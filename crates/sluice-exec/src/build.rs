//! Instantiate concrete decoders, steps and encoders from a compiled plan.

use std::fmt::Display;

use sluice_core::config::EngineConfig;
use sluice_io::csv::{CsvDecoder, CsvEncoder, DECODE_OP, ENCODE_OP};
use sluice_io::{Decoder, Encoder};
use sluice_operators::filter::Filter;
use sluice_operators::head::Head;
use sluice_operators::rename::Rename;
use sluice_operators::sample::Sample;
use sluice_operators::select::Select;
use sluice_operators::skip::Skip;
use sluice_operators::sort::Sort;
use sluice_operators::stats::StatsStep;
use sluice_operators::Step;
use sluice_planner::{DecoderSpec, EncoderSpec, PlanError, StepSpec};

use crate::error::ExecError;

fn invalid_args(op: &str, e: impl Display) -> ExecError {
    ExecError::Plan(PlanError::InvalidArgs {
        op: op.to_string(),
        reason: e.to_string(),
    })
}

fn boxed<S: Step + 'static>(step: S) -> Box<dyn Step> {
    Box::new(step)
}

pub fn build_decoder(
    spec: &DecoderSpec,
    config: &EngineConfig,
) -> Result<Box<dyn Decoder>, ExecError> {
    match spec {
        DecoderSpec::Csv(opts) => {
            let dec = CsvDecoder::new(opts, config).map_err(|e| invalid_args(DECODE_OP, e))?;
            Ok(Box::new(dec))
        }
    }
}

pub fn build_encoder(spec: &EncoderSpec) -> Result<Box<dyn Encoder>, ExecError> {
    match spec {
        EncoderSpec::Csv(opts) => {
            let enc = CsvEncoder::new(opts).map_err(|e| invalid_args(ENCODE_OP, e))?;
            Ok(Box::new(enc))
        }
    }
}

pub fn build_step(spec: &StepSpec, config: &EngineConfig) -> Result<Box<dyn Step>, ExecError> {
    let step = match spec {
        StepSpec::Stats(args) => Ok(boxed(StatsStep::with_seed(args, config.sample_seed))),
        StepSpec::Filter(args) => Filter::new(args).map(boxed),
        StepSpec::Select(args) => Select::new(args).map(boxed),
        StepSpec::Rename(args) => Ok(boxed(Rename::new(args))),
        StepSpec::Head(args) => Ok(boxed(Head::new(args))),
        StepSpec::Skip(args) => Ok(boxed(Skip::new(args))),
        StepSpec::Sort(args) => Sort::new(args).map(boxed),
        StepSpec::Sample(args) => Sample::with_seed(args, config.sample_seed).map(boxed),
    };
    step.map_err(|e| invalid_args(spec.op(), e))
}
