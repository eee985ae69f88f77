use crate::cell::InputCell;

use ckb_types::core::TransactionView;
use ckb_types::{bytes::Bytes, constants::TX_VERSION, packed, prelude::*};

use std::collections::BTreeMap;

#[derive(Default, Clone, Debug)]
pub struct CellWithData {
    pub cell: packed::CellOutput,
    pub data: packed::Bytes,
}

impl CellWithData {
    pub fn new(cell: packed::CellOutput, data: Bytes) -> Self {
        CellWithData {
            cell,
            data: data.pack(),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.cell.capacity().unpack()
    }
}

/// An unsigned transaction under construction.
///
/// `input_sinces` is keyed by input position, inputs without an entry are
/// spent with since `0`.
#[derive(Default, Clone, Debug)]
pub struct TransactionSkeleton {
    pub inputs: Vec<InputCell>,
    pub outputs: Vec<CellWithData>,
    pub cell_deps: Vec<packed::CellDep>,
    pub header_deps: Vec<packed::Byte32>,
    pub input_sinces: BTreeMap<usize, u64>,
    pub witnesses: Vec<packed::Bytes>,
}

impl TransactionSkeleton {
    pub fn new(inputs: Vec<InputCell>, outputs: Vec<CellWithData>) -> Self {
        TransactionSkeleton {
            inputs,
            outputs,
            ..Default::default()
        }
    }

    pub fn output_capacity(&self) -> u128 {
        self.outputs
            .iter()
            .map(|output| u128::from(output.capacity()))
            .sum()
    }

    pub fn to_transaction_view(&self) -> TransactionView {
        let inputs = self
            .inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let since = self.input_sinces.get(&index).copied().unwrap_or_default();
                packed::CellInputBuilder::default()
                    .since(since.pack())
                    .previous_output(input.cell.out_point.clone())
                    .build()
            })
            .collect::<Vec<_>>();
        let (outputs, outputs_data): (Vec<_>, Vec<_>) = self
            .outputs
            .iter()
            .map(|output| (output.cell.clone(), output.data.clone()))
            .unzip();

        TransactionView::new_advanced_builder()
            .version(TX_VERSION.pack())
            .cell_deps(self.cell_deps.clone())
            .header_deps(self.header_deps.clone())
            .inputs(inputs)
            .outputs(outputs)
            .outputs_data(outputs_data)
            .witnesses(self.witnesses.clone())
            .build()
    }
}
