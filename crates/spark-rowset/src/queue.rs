//! 带超时的定长阻塞队列。
//!
//! # 设计背景（Why）
//! - 行集的阻塞语义必须是“最多等待给定时长，然后返回失败”，不能无限阻塞，也不能以错误或 panic 报告超时；
//! - 有界变体的行缓冲与批量变体的两个批次池都需要同一套语义，因此抽成 crate 内部的共享原语。
//!
//! # 实现要点（How）
//! - `parking_lot::Mutex<VecDeque<T>>` 保存元素，`not_empty`/`not_full` 两个条件变量分别唤醒消费者与生产者；
//! - 超时以绝对截止时间判定：只有在 `Instant::now() >= deadline` 时才放弃，虚假唤醒与提前返回都会重新进入等待，
//!   从而保证“失败返回不早于给定时长”；
//! - 等待时长溢出 `Instant` 表示范围（例如 [`Duration::MAX`]）时视为无限等待。
//!
//! # 契约说明（What）
//! - 互斥锁释放后再 `notify_one`，入队与出队之间形成 happens-before 关系；
//! - 容量由调用方保证为正，队列本身不做校验。

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

pub(crate) struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> BoundedQueue<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "有界队列容量必须为正");
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// 在 `wait` 内尝试入队；超时后把元素原样交还给调用方。
    pub(crate) fn offer(&self, item: T, wait: Duration) -> Result<(), T> {
        let deadline = Instant::now().checked_add(wait);
        let mut items = self.items.lock();
        while items.len() >= self.capacity {
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Err(item);
                    }
                    self.not_full.wait_until(&mut items, deadline);
                }
                None => self.not_full.wait(&mut items),
            }
        }
        items.push_back(item);
        drop(items);
        self.not_empty.notify_one();
        Ok(())
    }

    /// 不等待的入队。
    pub(crate) fn try_offer(&self, item: T) -> Result<(), T> {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            return Err(item);
        }
        items.push_back(item);
        drop(items);
        self.not_empty.notify_one();
        Ok(())
    }

    /// 在 `wait` 内尝试出队。
    pub(crate) fn poll(&self, wait: Duration) -> Option<T> {
        let deadline = Instant::now().checked_add(wait);
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                drop(items);
                self.not_full.notify_one();
                return Some(item);
            }
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    self.not_empty.wait_until(&mut items, deadline);
                }
                None => self.not_empty.wait(&mut items),
            }
        }
    }

    /// 不等待的出队。
    pub(crate) fn try_poll(&self) -> Option<T> {
        let item = self.items.lock().pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// 清空队列，并唤醒所有等待空位的生产者。
    pub(crate) fn clear(&self) {
        let drained: Vec<T> = self.items.lock().drain(..).collect();
        self.not_full.notify_all();
        // 元素在锁外析构。
        drop(drained);
    }
}
