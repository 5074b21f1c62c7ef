use leptos::prelude::*;

/// 请求超过延时仍未返回时显示在内容区的转圈
#[component]
pub fn LoadingIndicator() -> impl IntoView {
    view! {
        <svg
            xmlns="http://www.w3.org/2000/svg"
            width="32px"
            height="32px"
            viewBox="0 0 100 100"
            style="margin: 0 auto;"
        >
            <g>
                <circle cx="50" cy="50" fill="none" stroke="#dbe6e8" stroke-width="12" r="36" />
                <circle
                    cx="50"
                    cy="50"
                    fill="none"
                    stroke="#4aa5e0"
                    stroke-width="12"
                    r="36"
                    stroke-dasharray="50 180"
                />
                <animateTransform
                    attributeName="transform"
                    type="rotate"
                    repeatCount="indefinite"
                    dur="1s"
                    values="0 50 50;360 50 50"
                    keyTimes="0;1"
                />
            </g>
        </svg>
    }
}
