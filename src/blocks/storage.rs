// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Archival & Storage Fees

//! Chain history growth, pledged capacity and the storage fee market.

use tracing::debug;

use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};
use crate::units::{SECTOR_SIZE, SEGMENT_HISTORY_SIZE, SEGMENT_SIZE};

/// History bytes written per archived buffer byte.
const HISTORY_EXPANSION: f64 = SEGMENT_HISTORY_SIZE / SEGMENT_SIZE;

/// Buffer transaction and header bytes, archiving whole segments once the
/// buffer holds at least one.
pub fn p_archive(params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let header_volume = state.delta_blocks * params.header_size;
    let tx_volume = state.transaction_count * state.average_transaction_size;
    let new_buffer_bytes = tx_volume + header_volume;
    let current_buffer = state.buffer_size + new_buffer_bytes;

    // Validated params keep the segment size positive.
    let segment_size = params.archival_buffer_segment_size;
    let segments = (current_buffer / segment_size).floor();
    let archived = segments * segment_size;

    Ok(Signal::new()
        .with(Field::BufferSize, new_buffer_bytes - archived)
        .with(Field::BlockchainHistorySize, archived * HISTORY_EXPANSION))
}

/// Grow pledged space by the larger of the farmers' new sectors and the
/// shortfall against the replication requirement.
pub fn p_pledge_sectors(params: &Params, state: &State, ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let required = state.blockchain_history_size * params.min_replication_factor;
    let shortfall = (required - state.total_space_pledged).max(0.0);

    let sectors = ctx.draw(&params.environment.new_sectors_per_day, params, state)?.max(0.0).trunc();
    let organic = sectors * SECTOR_SIZE * state.delta_days;

    let newly_pledged = organic.max(shortfall);
    Ok(Signal::new()
        .with(Field::TotalSpacePledged, newly_pledged)
        .with(Field::NewlyPledgedSpace, newly_pledged))
}

/// Price storage from the credit supply over free space and charge holders
/// for the bytes written this step.
pub fn p_storage_fees(params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let credit_supply = params.credit_supply_definition.credit_supply(state);
    let free_space = (state.total_space_pledged / params.min_replication_factor - state.blockchain_history_size).max(1.0);
    let fee_per_byte = credit_supply / free_space;

    let extrinsic_length = state.transaction_count * state.average_transaction_size;
    let fee_volume = fee_per_byte * extrinsic_length;

    // Fees never take more than half of what holders have.
    let cap = state.holders_balance.max(0.0) / 2.0;
    let effective = fee_volume.min(cap);
    if fee_volume > cap {
        debug!(requested = fee_volume, charged = effective, "storage fees capped by holders balance");
    }

    let to_fund = params.fund_tax_on_storage_fees * effective;
    let to_farmers = effective - to_fund;

    Ok(Signal::new()
        .with(Field::FreeSpace, free_space)
        .with(Field::StorageFeeInCreditsPerBytes, fee_per_byte)
        .with(Field::ExtrinsicLengthInBytes, extrinsic_length)
        .with(Field::StorageFeeVolume, effective)
        .with(Field::StorageFeesToFarmers, to_farmers)
        .with(Field::StorageFeesToFund, to_fund)
        .with(Field::FarmersBalance, to_farmers)
        .with(Field::FundBalance, to_fund)
        .with(Field::HoldersBalance, -effective))
}
