// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Client side of the analysis service.

pub mod pipeline;
pub mod retrieval;
pub mod transport;
