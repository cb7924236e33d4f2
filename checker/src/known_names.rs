// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::ir::MethodDescriptor;
use crate::tag_domain;
use crate::utils::{JAVA_LANG_STRING, JAVA_LANG_STRING_BUFFER, JAVA_LANG_STRING_BUILDER};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Well known library methods that are treated in special ways.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialOrd, PartialEq, Hash, Ord)]
pub enum KnownNames {
    /// This is not a known name
    None,
    /// format on any class. Only date formatters are modeled, which is decided by the
    /// static type of the receiver, not by the declaring class.
    Format,
    SmsGetDisplayMessageBody,
    SmsGetDisplayOriginatingAddress,
    SmsGetMessageBody,
    SmsGetOriginatingAddress,
    StringAppend,
    StringConcat,
    StringInit,
    StringSubstring,
    StringToLowerCase,
    StringToString,
    StringValueOf,
}

const ANDROID_SMS_MESSAGE: &str = "android.telephony.SmsMessage";
const ANDROID_GSM_SMS_MESSAGE: &str = "android.telephony.gsm.SmsMessage";

lazy_static! {
    /// declaring class -> method name -> known name
    static ref KNOWN_METHODS: HashMap<&'static str, HashMap<&'static str, KnownNames>> = {
        let mut table: HashMap<&'static str, HashMap<&'static str, KnownNames>> = HashMap::new();
        let mut add = |class: &'static str, name: &'static str, known_name: KnownNames| {
            table.entry(class).or_default().insert(name, known_name);
        };
        for builder in &[JAVA_LANG_STRING_BUILDER, JAVA_LANG_STRING_BUFFER] {
            add(*builder, "append", KnownNames::StringAppend);
        }
        for class in &[JAVA_LANG_STRING, JAVA_LANG_STRING_BUILDER, JAVA_LANG_STRING_BUFFER] {
            add(*class, "<init>", KnownNames::StringInit);
            add(*class, "toString", KnownNames::StringToString);
        }
        add(JAVA_LANG_STRING, "concat", KnownNames::StringConcat);
        add(JAVA_LANG_STRING, "substring", KnownNames::StringSubstring);
        add(JAVA_LANG_STRING, "toLowerCase", KnownNames::StringToLowerCase);
        add(JAVA_LANG_STRING, "valueOf", KnownNames::StringValueOf);
        for sms in &[ANDROID_SMS_MESSAGE, ANDROID_GSM_SMS_MESSAGE] {
            add(*sms, "getMessageBody", KnownNames::SmsGetMessageBody);
            add(*sms, "getDisplayMessageBody", KnownNames::SmsGetDisplayMessageBody);
            add(*sms, "getOriginatingAddress", KnownNames::SmsGetOriginatingAddress);
            add(
                *sms,
                "getDisplayOriginatingAddress",
                KnownNames::SmsGetDisplayOriginatingAddress,
            );
        }
        table
    };

    static ref DATE_FORMAT_TYPES: HashSet<&'static str> = [
        "android.icu.text.DateFormat",
        "android.icu.text.SimpleDateFormat",
        "java.text.DateFormat",
        "java.text.SimpleDateFormat",
    ]
    .iter()
    .copied()
    .collect();
}

impl KnownNames {
    /// The provenance tag the method attaches to its result, if it is a taint source.
    pub fn source_tag(self) -> Option<&'static str> {
        match self {
            KnownNames::SmsGetMessageBody | KnownNames::SmsGetDisplayMessageBody => {
                Some(tag_domain::SMS_BODY)
            }
            KnownNames::SmsGetOriginatingAddress | KnownNames::SmsGetDisplayOriginatingAddress => {
                Some(tag_domain::SMS_SENDER)
            }
            _ => None,
        }
    }

    /// True if the call updates the string held by its receiver, so the body visitor must
    /// record the result for the receiver too.
    pub fn updates_receiver(self) -> bool {
        matches!(self, KnownNames::StringAppend | KnownNames::StringInit)
    }
}

/// True if values of the named type format dates.
pub fn is_date_format_type(type_name: &str) -> bool {
    DATE_FORMAT_TYPES.contains(type_name)
}

/// An analysis lifetime cache that contains a map from method descriptors to known names.
#[derive(Debug, Default)]
pub struct KnownNamesCache {
    name_cache: HashMap<Rc<MethodDescriptor>, KnownNames>,
}

impl KnownNamesCache {
    /// Create an empty known names cache.
    /// This cache is re-used by every successive body visitor instance.
    pub fn create_cache() -> KnownNamesCache {
        KnownNamesCache {
            name_cache: HashMap::new(),
        }
    }

    /// Get the well known name for the given method and cache the association.
    /// If the method does not have a well known name, this returns KnownNames::None.
    pub fn get(&mut self, method: &Rc<MethodDescriptor>) -> KnownNames {
        *self
            .name_cache
            .entry(method.clone())
            .or_insert_with(|| Self::get_known_name_for(method))
    }

    fn get_known_name_for(method: &MethodDescriptor) -> KnownNames {
        if let Some(known_name) = KNOWN_METHODS
            .get(method.class.as_str())
            .and_then(|methods| methods.get(method.name.as_str()))
        {
            return *known_name;
        }
        match method.name.as_str() {
            "format" => KnownNames::Format,
            _ => KnownNames::None,
        }
    }
}
