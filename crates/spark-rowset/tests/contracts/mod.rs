//! `contracts` 集成测试入口：从 crate 公开 API 的视角校验五种行集变体共同遵守的通道契约。
//!
//! # 结构安排（How）
//! - `support`：工厂夹具与“消费者约定”式排空逻辑；
//! - `lifecycle`：结束标志、`clear` 幂等与复位；
//! - `ordering`：身份展示、目标三元组排序；
//! - `backpressure`：有界变体的超时与容量上限；
//! - `handoff`：单生产者/单消费者并发下的顺序与不丢行。

mod backpressure;
mod handoff;
mod lifecycle;
mod ordering;
mod support;
