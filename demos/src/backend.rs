//! Backend selection for the demo binaries.
//!
//! The `wgpu` feature switches the tools to the GPU; otherwise they run on the
//! CPU through `ndarray`.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "wgpu")] {
        use burn::backend::wgpu::{Wgpu, WgpuDevice};

        /// Backend the demo tools run losses on
        pub type SelectedBackend = Wgpu;
        /// Device type of [`SelectedBackend`]
        pub type SelectedDevice = WgpuDevice;

        /// Creates the default GPU device
        pub fn create_device() -> SelectedDevice {
            WgpuDevice::default()
        }

        /// Human readable backend name for log output
        pub const fn get_backend_name() -> &'static str {
            "WGPU (GPU)"
        }
    } else {
        use burn::backend::ndarray::{NdArray, NdArrayDevice};

        /// Backend the demo tools run losses on
        pub type SelectedBackend = NdArray;
        /// Device type of [`SelectedBackend`]
        pub type SelectedDevice = NdArrayDevice;

        /// Creates the CPU device
        pub fn create_device() -> SelectedDevice {
            NdArrayDevice::default()
        }

        /// Human readable backend name for log output
        pub const fn get_backend_name() -> &'static str {
            "NdArray (CPU)"
        }
    }
}
