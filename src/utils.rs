/// Writes to the browser console. Compiles to nothing off the web so native
/// tests never touch JS imports.
pub fn log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        $crate::utils::log(&format!($($arg)*))
    };
}

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}
