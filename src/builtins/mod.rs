//! Built-in column kernels

pub mod ops;

pub use ops::{
    group_mean, mean, quantile_sorted, scale_column, scale_into, sum, GroupAccumulator,
};
