//! Pipeline: decoder → steps → encoder, driven by push/finish/pull.
//!
//! Everything runs synchronously on the caller's thread. Encoded rows
//! accumulate in the main channel and side-channel records in their own
//! buffers until the caller pulls them.

use serde::Serialize;
use sluice_core::batch::Batch;
use sluice_core::config::EngineConfig;
use sluice_core::error::Error as CoreError;
use sluice_io::{Decoder, Encoder};
use sluice_mem::ByteBuffer;
use sluice_operators::{write_json_line, SideChannels, Step};
use sluice_planner::{compile, CompiledPlan, Plan};

use crate::build::{build_decoder, build_encoder, build_step};
use crate::error::ExecError;
use crate::last_error::set_last_error;
use crate::metrics::emit_span;

/// Output channels, by stable index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Main = 0,
    Errors = 1,
    Stats = 2,
    Samples = 3,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Main,
        Channel::Errors,
        Channel::Stats,
        Channel::Samples,
    ];

    pub fn from_index(idx: usize) -> Option<Channel> {
        Channel::ALL.get(idx).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Run counters; also the record written to the stats channel on finish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub rows_in: u64,
    pub rows_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

pub struct Pipeline {
    decoder: Box<dyn Decoder>,
    steps: Vec<Box<dyn Step>>,
    encoder: Box<dyn Encoder>,
    config: EngineConfig,
    main: ByteBuffer,
    side: SideChannels,
    stats: RunStats,
    finished: bool,
    error: Option<String>,
}

impl Pipeline {
    /// Build a pipeline from a JSON (or YAML) plan document.
    ///
    /// Failures are recorded in [`crate::last_error`].
    pub fn create(plan: &str) -> Result<Self, ExecError> {
        let result = Plan::parse(plan)
            .map_err(ExecError::from)
            .and_then(|p| Self::from_plan(&p));
        if let Err(e) = &result {
            let msg = e.to_string();
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %msg, "pipeline creation failed");
            set_last_error(&msg);
        }
        result
    }

    pub fn from_plan(plan: &Plan) -> Result<Self, ExecError> {
        Self::from_compiled(&compile(plan)?)
    }

    /// The plan's `config` block wins over the environment.
    pub fn from_compiled(compiled: &CompiledPlan) -> Result<Self, ExecError> {
        let config = compiled
            .config
            .clone()
            .unwrap_or_else(EngineConfig::from_env);
        config.validate().map_err(|e| match e {
            CoreError::Config(msg) => ExecError::Config(msg),
            other => ExecError::Config(other.to_string()),
        })?;

        let decoder = build_decoder(&compiled.decoder, &config)?;
        let steps = compiled
            .steps
            .iter()
            .map(|s| build_step(s, &config))
            .collect::<Result<Vec<_>, _>>()?;
        let encoder = build_encoder(&compiled.encoder)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            steps = ?compiled.steps.iter().map(|s| s.op()).collect::<Vec<_>>(),
            batch_size = config.batch_size,
            "pipeline created"
        );

        Ok(Self::from_parts(decoder, steps, encoder, config))
    }

    /// Assemble a pipeline from already-built components.
    pub fn from_parts(
        decoder: Box<dyn Decoder>,
        steps: Vec<Box<dyn Step>>,
        encoder: Box<dyn Encoder>,
        config: EngineConfig,
    ) -> Self {
        Self {
            decoder,
            steps,
            encoder,
            config,
            main: ByteBuffer::new(),
            side: SideChannels::new(),
            stats: RunStats::default(),
            finished: false,
            error: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Feed input bytes. Complete records are decoded and run through the
    /// steps immediately; a trailing partial record waits for more input.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), ExecError> {
        if self.finished {
            return Err(self.fail(ExecError::Usage("pipeline already finished")));
        }
        self.push_inner(bytes).map_err(|e| self.fail(e))
    }

    fn push_inner(&mut self, bytes: &[u8]) -> Result<(), ExecError> {
        self.stats.bytes_in += bytes.len() as u64;
        let batches = self
            .decoder
            .decode(bytes)
            .map_err(|e| ExecError::Decode(e.to_string()))?;
        for batch in batches {
            self.stats.rows_in += batch.n_rows() as u64;
            self.run_from(0, batch)?;
        }
        Ok(())
    }

    /// End of input: flush the decoder, then every step in order, then the
    /// encoder, and write the run summary to the stats channel.
    pub fn finish(&mut self) -> Result<(), ExecError> {
        if self.finished {
            return Err(self.fail(ExecError::Usage("pipeline already finished")));
        }
        self.finished = true;
        self.finish_inner().map_err(|e| self.fail(e))
    }

    fn finish_inner(&mut self) -> Result<(), ExecError> {
        let tail = self
            .decoder
            .flush()
            .map_err(|e| ExecError::Decode(e.to_string()))?;
        for batch in tail {
            self.stats.rows_in += batch.n_rows() as u64;
            self.run_from(0, batch)?;
        }

        for i in 0..self.steps.len() {
            let step = &mut self.steps[i];
            let flushed = step
                .flush(&mut self.side)
                .map_err(|e| ExecError::Step(format!("{}: {}", step.name(), e)))?;
            if let Some(batch) = flushed {
                self.run_from(i + 1, batch)?;
            }
        }

        let before = self.main.readable();
        self.encoder
            .flush(&mut self.main)
            .map_err(|e| ExecError::Encode(e.to_string()))?;
        self.stats.bytes_out += (self.main.readable() - before) as u64;

        write_json_line(&mut self.side.stats, &self.stats)
            .map_err(|e| ExecError::Step(e.to_string()))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            rows_in = self.stats.rows_in,
            rows_out = self.stats.rows_out,
            bytes_in = self.stats.bytes_in,
            bytes_out = self.stats.bytes_out,
            "pipeline finished"
        );
        emit_span(
            "pipeline.finish",
            &[
                ("rows_in", self.stats.rows_in.to_string()),
                ("rows_out", self.stats.rows_out.to_string()),
            ],
        );
        Ok(())
    }

    /// Thread `batch` through steps `start..` and encode whatever survives.
    fn run_from(&mut self, start: usize, batch: Batch) -> Result<(), ExecError> {
        let mut current = Some(batch);
        for step in &mut self.steps[start..] {
            let Some(batch) = current.take() else {
                break;
            };
            current = step
                .process(batch, &mut self.side)
                .map_err(|e| ExecError::Step(format!("{}: {}", step.name(), e)))?;
        }

        let Some(batch) = current else {
            return Ok(());
        };
        if batch.n_rows() == 0 {
            return Ok(());
        }
        let before = self.main.readable();
        self.encoder
            .encode(&batch, &mut self.main)
            .map_err(|e| ExecError::Encode(e.to_string()))?;
        self.stats.rows_out += batch.n_rows() as u64;
        self.stats.bytes_out += (self.main.readable() - before) as u64;
        Ok(())
    }

    fn fail(&mut self, err: ExecError) -> ExecError {
        let msg = err.to_string();
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %msg, "pipeline failed");
        set_last_error(&msg);
        self.error = Some(msg);
        err
    }

    fn channel(&mut self, channel: Channel) -> &mut ByteBuffer {
        match channel {
            Channel::Main => &mut self.main,
            Channel::Errors => &mut self.side.errors,
            Channel::Stats => &mut self.side.stats,
            Channel::Samples => &mut self.side.samples,
        }
    }

    /// Drain up to `max` bytes from `channel`.
    pub fn pull(&mut self, channel: Channel, max: usize) -> Vec<u8> {
        self.channel(channel).read_to_vec(max)
    }

    /// Copy up to `out.len()` bytes from `channel` into `out`; returns the
    /// number copied (zero when nothing is pending).
    pub fn pull_into(&mut self, channel: Channel, out: &mut [u8]) -> usize {
        self.channel(channel).read(out)
    }

    pub fn pending(&mut self, channel: Channel) -> usize {
        self.channel(channel).readable()
    }

    /// Message of the most recent failure on this pipeline.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
