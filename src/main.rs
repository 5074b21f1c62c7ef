#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    if let Err(err) = docs_viewer::start() {
        web_sys::console::error_1(&format!("[启动] 初始化失败: {err}").into());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("docs-viewer 只在浏览器中运行，请用 trunk 构建 wasm32 目标");
}
