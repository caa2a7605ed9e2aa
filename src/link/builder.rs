//! `scheme://user@host:port?query#fragment` 构造器
//!
//! 查询参数保存在 BTreeMap 中, 输出时按键排序, 因此相同输入总是得到相同字符串。

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::form_urlencoded;

/// userinfo 中需要转义的字符
const USERINFO: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// fragment 中需要转义的字符
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`');

#[derive(Debug, Clone)]
pub struct LinkBuilder {
    scheme: String,
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    raw_userinfo: Option<String>,
    path: String,
    query: BTreeMap<String, String>,
    fragment: Option<String>,
}

impl LinkBuilder {
    pub fn new<S: Into<String>>(scheme: S, host: &str, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.to_string(),
            port,
            username: None,
            password: None,
            raw_userinfo: None,
            path: String::new(),
            query: BTreeMap::new(),
            fragment: None,
        }
    }

    /// 只有用户名的 userinfo
    pub fn user(mut self, username: &str) -> Self {
        if !username.is_empty() {
            self.username = Some(username.to_string());
        }
        self
    }

    /// `user:password` 形式; 两者都为空时不输出 userinfo
    pub fn user_password(mut self, username: &str, password: &str) -> Self {
        if !username.is_empty() || !password.is_empty() {
            self.username = Some(username.to_string());
            self.password = Some(password.to_string());
        }
        self
    }

    /// 已经编码好的 userinfo (例如 base64)
    pub fn raw_user(mut self, userinfo: String) -> Self {
        self.raw_userinfo = Some(userinfo);
        self
    }

    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = path.into();
        self
    }

    pub fn fragment(mut self, fragment: &str) -> Self {
        if !fragment.is_empty() {
            self.fragment = Some(fragment.to_string());
        }
        self
    }

    /// 非空字符串才写入
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.query.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// 仅在为 true 时写入
    pub fn flag(&mut self, key: &str, value: bool) -> &mut Self {
        if value {
            self.query.insert(key.to_string(), "true".to_string());
        }
        self
    }

    /// 仅在非零时写入
    pub fn number<N: Into<u64>>(&mut self, key: &str, value: N) -> &mut Self {
        let value = value.into();
        if value != 0 {
            self.query.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// 多值字段: 排序后用 `sep` 连接
    pub fn sorted(&mut self, key: &str, values: &[String], sep: &str) -> &mut Self {
        let mut values: Vec<&str> = values
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        values.sort_unstable();
        values.dedup();
        self.set(key, &values.join(sep))
    }

    /// 按原有顺序连接 (分享链接需要保留顺序)
    pub fn joined(&mut self, key: &str, values: &[String], sep: &str) -> &mut Self {
        self.set(key, &values.join(sep))
    }

    pub fn build(&self) -> String {
        let mut out = format!("{}://", self.scheme);

        if let Some(raw) = &self.raw_userinfo {
            out.push_str(raw);
            out.push('@');
        } else if let Some(user) = &self.username {
            out.extend(utf8_percent_encode(user, USERINFO));
            if let Some(pass) = &self.password {
                out.push(':');
                out.extend(utf8_percent_encode(pass, USERINFO));
            }
            out.push('@');
        }

        out.push_str(&join_host_port(&self.host, self.port));
        out.push_str(&self.path);

        if !self.query.is_empty() {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (k, v) in &self.query {
                query.append_pair(k, v);
            }
            out.push('?');
            out.push_str(&query.finish());
        }

        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.extend(utf8_percent_encode(fragment, FRAGMENT));
        }
        out
    }
}

/// 拼接 host 与端口; 端口为 0 时只返回 host, IPv6 地址加方括号
pub fn join_host_port(host: &str, port: u16) -> String {
    let bracketed = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    };
    if port == 0 {
        bracketed
    } else {
        format!("{}:{}", bracketed, port)
    }
}
