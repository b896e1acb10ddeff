// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Published output vectors for the supported generators.

/// glibc rand() after srand(1).
pub const GLIBC_RAND_SEED1: [u32; 10] = [
    1804289383, 846930886, 1681692777, 1714636915, 1957747793, 424238335, 719885386, 1649760492,
    596516649, 1189641421,
];

/// MT19937 with the reference default seed 5489.
pub const MT19937_SEED5489: [u32; 5] = [3499211612, 581869302, 3890346734, 3586334585, 545404204];

/// MSVC rand() after srand(1).
pub const MSVC_RAND_SEED1: [u32; 8] = [41, 18467, 6334, 26500, 19169, 15724, 11478, 29358];

/// RANDU from seed 1.
pub const RANDU_SEED1: [u32; 5] = [65539, 393225, 1769499, 7077969, 26542323];
