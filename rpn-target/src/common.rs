pub use anyhow::{bail, ensure, format_err, Context as _, Result};
pub use bbox::{prelude::*, CxCyWH, Size, Transform, XYXY};
pub use indexmap::IndexSet;
pub use itertools::iproduct;
pub use label::Label;
pub use log::{debug, info, warn};
pub use ndarray::{Array2, ArrayView2};
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{fmt::Debug, path::Path, sync::Arc};
