use ckb_types::core::EpochNumberWithFraction;

use std::cmp::Ordering;

const NUMBER_MASK: u64 = 0xFF_FFFF;
const FRACTION_MASK: u64 = 0xFFFF;
const INDEX_OFFSET: u64 = 24;
const LENGTH_OFFSET: u64 = 40;

/// Epoch position of a block: `number` plus the fraction `index / length`.
///
/// Packed as `length << 40 | index << 24 | number`, the layout of the `epoch`
/// field of a block header and of epoch based since values.
///
/// Equality is structural. Use [`Epoch::compare`] for chain order, where
/// `(1, 1, 2)` and `(1, 2, 4)` are the same point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Epoch {
    number: u64,
    index: u64,
    length: u64,
}

impl Epoch {
    pub const fn new(number: u64, index: u64, length: u64) -> Self {
        Epoch {
            number,
            index,
            length,
        }
    }

    pub fn from_full_value(value: u64) -> Self {
        Epoch {
            number: value & NUMBER_MASK,
            index: (value >> INDEX_OFFSET) & FRACTION_MASK,
            length: (value >> LENGTH_OFFSET) & FRACTION_MASK,
        }
    }

    pub fn full_value(&self) -> u64 {
        ((self.length & FRACTION_MASK) << LENGTH_OFFSET)
            | ((self.index & FRACTION_MASK) << INDEX_OFFSET)
            | (self.number & NUMBER_MASK)
    }

    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.full_value())
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn compare(&self, other: &Epoch) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.fraction_cmp(other))
    }

    fn fraction_cmp(&self, other: &Epoch) -> Ordering {
        let lhs = u128::from(self.index) * u128::from(other.length);
        let rhs = u128::from(other.index) * u128::from(self.length);
        lhs.cmp(&rhs)
    }
}

impl From<EpochNumberWithFraction> for Epoch {
    fn from(epoch: EpochNumberWithFraction) -> Self {
        Epoch::from_full_value(epoch.full_value())
    }
}

impl From<Epoch> for EpochNumberWithFraction {
    fn from(epoch: Epoch) -> Self {
        EpochNumberWithFraction::from_full_value(epoch.full_value())
    }
}
