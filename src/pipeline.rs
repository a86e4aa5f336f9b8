// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Block Pipeline

//! Per-timestep transition function.
//!
//! A [`Block`] bundles policies, which read the pre-block state and emit a
//! [`Signal`], and update rules, which fold that signal into state fields.
//! Blocks run in declaration order; every block sees the state committed by
//! the one before it.

use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::drivers::{Driver, EnvironmentalDriver};
use crate::error::EngineError;
use crate::params::Params;
use crate::state::{Field, State};

// ─── Signal ──────────────────────────────────────────────────────────────────

/// Values emitted by one block's policies, keyed by the field they target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signal {
    values: BTreeMap<Field, f64>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.values.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: Field, value: f64) -> Option<f64> {
        self.values.insert(field, value)
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(&field).copied()
    }

    pub fn get_or(&self, field: Field, default: f64) -> f64 {
        self.get(field).unwrap_or(default)
    }

    /// Fold a later policy's output into this one. On a shared key the later
    /// value wins; the overwritten keys are returned.
    pub fn merge(&mut self, later: Signal) -> Vec<Field> {
        let mut collisions = Vec::new();
        for (field, value) in later.values {
            if self.values.insert(field, value).is_some() {
                collisions.push(field);
            }
        }
        collisions
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }
}

impl FromIterator<(Field, f64)> for Signal {
    fn from_iter<I: IntoIterator<Item = (Field, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

// ─── Step context ────────────────────────────────────────────────────────────

/// Per-step inputs that are not part of the state: the timestep index and
/// the trajectory's RNG.
pub struct StepContext<'a> {
    pub timestep: u64,
    pub rng: &'a mut ChaCha8Rng,
}

impl<'a> StepContext<'a> {
    pub fn new(timestep: u64, rng: &'a mut ChaCha8Rng) -> Self {
        Self { timestep, rng }
    }

    pub fn draw(&mut self, driver: &Driver, params: &Params, state: &State) -> Result<f64, EngineError> {
        Ok(driver.evaluate(params, state, &mut *self.rng)?)
    }
}

pub type PolicyFn = fn(&Params, &State, &mut StepContext<'_>) -> Result<Signal, EngineError>;
pub type StateUpdateFn = fn(&Params, &State, &Signal, &mut StepContext<'_>) -> Result<f64, EngineError>;

// ─── Update rules ────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub enum UpdateRule {
    /// `signal[field]` or `default`; the previous value is discarded.
    Replace { field: Field, default: f64 },
    /// `state[field] + (signal[field] or default)`.
    Accumulate { field: Field, default: f64 },
    /// Computed by a dedicated state-update function.
    Custom { field: Field, update: StateUpdateFn },
}

impl UpdateRule {
    pub fn replace(field: Field) -> Self {
        UpdateRule::Replace { field, default: 0.0 }
    }

    pub fn accumulate(field: Field) -> Self {
        UpdateRule::Accumulate { field, default: 0.0 }
    }

    pub fn field(&self) -> Field {
        match self {
            UpdateRule::Replace { field, .. }
            | UpdateRule::Accumulate { field, .. }
            | UpdateRule::Custom { field, .. } => *field,
        }
    }

    pub fn apply(
        &self,
        params: &Params,
        state: &State,
        signal: &Signal,
        ctx: &mut StepContext<'_>,
    ) -> Result<f64, EngineError> {
        match self {
            UpdateRule::Replace { field, default } => Ok(signal.get_or(*field, *default)),
            UpdateRule::Accumulate { field, default } => Ok(state.get(*field) + signal.get_or(*field, *default)),
            UpdateRule::Custom { update, .. } => update(params, state, signal, ctx),
        }
    }
}

impl fmt::Debug for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateRule::Replace { field, .. } => write!(f, "replace({})", field),
            UpdateRule::Accumulate { field, .. } => write!(f, "accumulate({})", field),
            UpdateRule::Custom { field, .. } => write!(f, "custom({})", field),
        }
    }
}

// ─── Block ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Block {
    pub label: String,
    pub disabled: bool,
    pub policies: Vec<(&'static str, PolicyFn)>,
    pub variables: Vec<UpdateRule>,
}

impl Block {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
            policies: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn policy(mut self, name: &'static str, policy: PolicyFn) -> Self {
        self.policies.push((name, policy));
        self
    }

    pub fn replace(mut self, fields: &[Field]) -> Self {
        self.variables.extend(fields.iter().map(|&f| UpdateRule::replace(f)));
        self
    }

    pub fn accumulate(mut self, fields: &[Field]) -> Self {
        self.variables.extend(fields.iter().map(|&f| UpdateRule::accumulate(f)));
        self
    }

    pub fn update(mut self, field: Field, update: StateUpdateFn) -> Self {
        self.variables.push(UpdateRule::Custom { field, update });
        self
    }

    /// Keep the block in the list but leave it out of compiled pipelines.
    pub fn disable(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn execute(&self, params: &Params, state: &mut State, ctx: &mut StepContext<'_>) -> Result<(), EngineError> {
        let mut signal = Signal::new();
        for (name, policy) in &self.policies {
            let output = policy(params, state, ctx)?;
            for field in signal.merge(output) {
                debug!(block = %self.label, policy = name, %field, "signal key overwritten by later policy");
            }
        }

        // Every rule reads the pre-block state.
        let mut updates = Vec::with_capacity(self.variables.len());
        for rule in &self.variables {
            let value = rule.apply(params, state, &signal, ctx)?;
            if !value.is_finite() {
                return Err(EngineError::NonFinite {
                    block: self.label.clone(),
                    field: rule.field(),
                    value,
                });
            }
            updates.push((rule.field(), value));
        }
        for (field, value) in updates {
            state.set(field, value);
        }
        Ok(())
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("label", &self.label)
            .field("disabled", &self.disabled)
            .field("policies", &self.policies.iter().map(|(n, _)| *n).collect::<Vec<_>>())
            .field("variables", &self.variables)
            .finish()
    }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Compiled, ordered list of enabled blocks.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    blocks: Vec<Block>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Compile a block list, dropping disabled blocks.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks: blocks.into_iter().filter(|b| !b.disabled).collect(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn labels(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Run every block once, in order.
    pub fn step(&self, params: &Params, state: &mut State, ctx: &mut StepContext<'_>) -> Result<(), EngineError> {
        for block in &self.blocks {
            block.execute(params, state, ctx)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    blocks: Vec<Block>,
}

impl PipelineBuilder {
    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn blocks(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        self.blocks.extend(blocks);
        self
    }

    pub fn enable(self, label: &str) -> Self {
        self.set_disabled(label, false)
    }

    pub fn disable(self, label: &str) -> Self {
        self.set_disabled(label, true)
    }

    fn set_disabled(mut self, label: &str, disabled: bool) -> Self {
        for block in self.blocks.iter_mut().filter(|b| b.label == label) {
            block.disabled = disabled;
        }
        self
    }

    pub fn build(self) -> Pipeline {
        let skipped: Vec<&str> = self.blocks.iter().filter(|b| b.disabled).map(|b| b.label.as_str()).collect();
        if !skipped.is_empty() {
            debug!(?skipped, "disabled blocks left out of the pipeline");
        }
        Pipeline::new(self.blocks)
    }
}
