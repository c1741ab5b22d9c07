// Named Joshua tree shapes
//
// Type I trees are tall with many levels, type II are short and bushy.
// The `a` variants lose split probability with height, `b` adds occasional wide swings.

use super::branch::{BranchSpecBuilder, JoshuaTreeConfig};
use super::BranchSpec;
use crate::error::GenResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreePreset {
    TypeI,
    TypeIa,
    TypeIb,
    TypeII,
    TypeIIa,
    TypeIIb,
}

/// Preset mix used for random trees, weights sum to 1.
pub const FOREST: [(TreePreset, f32); 6] = [
    (TreePreset::TypeI, 0.1),
    (TreePreset::TypeIa, 0.2),
    (TreePreset::TypeIb, 0.2),
    (TreePreset::TypeII, 0.1),
    (TreePreset::TypeIIa, 0.2),
    (TreePreset::TypeIIb, 0.2),
];

impl TreePreset {
    pub const ALL: [TreePreset; 6] = [
        TreePreset::TypeI,
        TreePreset::TypeIa,
        TreePreset::TypeIb,
        TreePreset::TypeII,
        TreePreset::TypeIIa,
        TreePreset::TypeIIb,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TreePreset::TypeI => "Type I",
            TreePreset::TypeIa => "Type Ia",
            TreePreset::TypeIb => "Type Ib",
            TreePreset::TypeII => "Type II",
            TreePreset::TypeIIa => "Type IIa",
            TreePreset::TypeIIb => "Type IIb",
        }
    }

    /// Growth parameters for this preset, root length still at its default of 10.
    pub fn builder(self) -> BranchSpecBuilder {
        let tall = matches!(self, TreePreset::TypeI | TreePreset::TypeIa | TreePreset::TypeIb);
        let builder = if tall {
            BranchSpec::builder()
                .length_change(0.8)
                .length_vary_prop(0.2)
                .length_width(0.2)
                .angle_change(30.0)
                .angle_vary_prop(0.4)
                .split_prob(0.9)
                .levels(6)
        } else {
            BranchSpec::builder()
                .length_change(0.5)
                .length_vary_prop(0.1)
                .length_width(0.1)
                .angle_change(20.0)
                .angle_vary_prop(1.0)
                .split_prob(0.95)
                .levels(4)
        };
        let builder = builder
            .angle(-90.0)
            .width_change(0.9)
            .large_angle(60.0)
            .split_prob_change(1.0)
            .large_angle_prob(0.0);

        match self {
            TreePreset::TypeI | TreePreset::TypeII => builder,
            TreePreset::TypeIa | TreePreset::TypeIIa => builder.split_prob_change(0.9),
            TreePreset::TypeIb | TreePreset::TypeIIb => builder.split_prob_change(0.9).large_angle_prob(0.2),
        }
    }

    /// Full configuration with the default look.
    pub fn config(self) -> GenResult<JoshuaTreeConfig> {
        Ok(JoshuaTreeConfig::new(self.builder().build()?))
    }
}
