//! Degradation policy: maps (call site, failure tag, locale) to literal fallback text.
//!
//! Pure and deterministic. Every generator funnels its failures through here so the
//! quota/other branching exists exactly once.

use crate::domain::{CallSite, DomainError, GenerationFailure, Locale};

/// Fallback text selection. Quota notices and generic notices may use different locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegradationPolicy {
    quota_locale: Locale,
    fallback_locale: Locale,
}

impl Default for DegradationPolicy {
    /// Quota notices in Traditional Chinese, everything else in English.
    fn default() -> Self {
        Self::new(Locale::ZhTw, Locale::En)
    }
}

impl DegradationPolicy {
    pub fn new(quota_locale: Locale, fallback_locale: Locale) -> Self {
        Self {
            quota_locale,
            fallback_locale,
        }
    }

    /// Fallback text for a tagged generation failure. `message` is the user's text
    /// (echoed by some quota notices; may be empty).
    pub fn fallback(&self, site: CallSite, failure: &GenerationFailure, message: &str) -> String {
        if failure.is_quota() {
            quota_text(site, self.quota_locale, message)
        } else {
            other_text(site, self.fallback_locale)
        }
    }

    /// Fallback text for any pipeline error at `site`.
    ///
    /// A missing template is its own path for habit analysis ("tools unavailable");
    /// elsewhere it degrades like any non-quota failure.
    pub fn resolve(&self, site: CallSite, err: &DomainError, message: &str) -> String {
        match (site, err) {
            (CallSite::HabitAnalysis, DomainError::TemplateUnavailable { .. }) => {
                tools_unavailable(self.fallback_locale).to_string()
            }
            _ => self.fallback(site, &GenerationFailure::classify(err), message),
        }
    }
}

fn quota_banner(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "⚠️ The AI quota has run out, so I'm answering in backup mode.",
        Locale::ZhTw => "⚠️ OpenAI 配額已用完，現在使用備用回應模式。",
    }
}

fn tools_unavailable(locale: Locale) -> &'static str {
    match locale {
        Locale::En => {
            "Sorry, I'm having trouble accessing the analysis tools right now. Please try again later."
        }
        Locale::ZhTw => "抱歉，目前無法使用分析工具，請稍後再試。",
    }
}

fn quota_text(site: CallSite, locale: Locale, message: &str) -> String {
    let banner = quota_banner(locale);
    match (site, locale) {
        (CallSite::MealPlan, Locale::ZhTw) => format!(
            "{banner}

🍽️ **基本健康餐點建議**：

**早餐**：
• 燕麥粥配莓果和堅果
• 希臘優格
• 綠茶

**午餐**：
• 烤雞肉沙拉配蔬菜
• 藜麥
• 檸檬水

**晚餐**：
• 烤鮭魚
• 蒸蔬菜
• 糙米

**點心**：
• 蘋果配杏仁醬
• 綜合堅果

保持均衡飲食！🌟"
        ),
        (CallSite::MealPlan, Locale::En) => format!(
            "{banner}

🍽️ **Basic healthy meal ideas**:

**Breakfast**:
• Oatmeal with berries and nuts
• Greek yogurt
• Green tea

**Lunch**:
• Grilled chicken salad with vegetables
• Quinoa
• Lemon water

**Dinner**:
• Baked salmon
• Steamed vegetables
• Brown rice

**Snacks**:
• Apple with almond butter
• Mixed nuts

Keep your meals balanced! 🌟"
        ),
        (CallSite::WorkoutPlan, Locale::ZhTw) => format!(
            "{banner}

💪 **基本運動計劃**：

**熱身 (5分鐘)**：
• 輕慢跑
• 動態伸展

**主要運動 (25分鐘)**：
• 伏地挺身：3組，每組10次
• 深蹲：3組，每組15次
• 平板支撐：3組，每組30秒
• 弓箭步：3組，每邊10次

**緩和 (5分鐘)**：
• 靜態伸展
• 深呼吸

記得補充水分！💧"
        ),
        (CallSite::WorkoutPlan, Locale::En) => format!(
            "{banner}

💪 **Basic workout plan**:

**Warm-up (5 min)**:
• Light jog
• Dynamic stretches

**Main set (25 min)**:
• Push-ups: 3 sets of 10
• Squats: 3 sets of 15
• Plank: 3 sets of 30 seconds
• Lunges: 3 sets of 10 per leg

**Cool-down (5 min)**:
• Static stretches
• Deep breathing

Remember to stay hydrated! 💧"
        ),
        (CallSite::HabitAnalysis, Locale::ZhTw) => format!(
            "{banner}

📊 **基本健康習慣分析**

雖然無法使用 AI 進行詳細分析，但這裡有一些通用建議：

**建議追蹤的日常習慣：**
• 體重（重視一致性而非每日變化）
• 營養（均衡飲食）
• 運動（有氧和力量訓練結合）
• 水分攝取（每日 8-10 杯水）
• 睡眠（每晚 7-9 小時）

**快速小貼士：**
✅ 定期記錄活動以獲得更好的洞察
✅ 專注於進步，而非完美
✅ 慶祝小勝利

持續追蹤你的活動，等配額恢復後我會提供更個人化的分析！💪

請稍後再請我分析你的習慣。"
        ),
        (CallSite::HabitAnalysis, Locale::En) => format!(
            "{banner}

📊 **Basic habit review**

I can't run a detailed AI analysis right now, but here are some general pointers:

**Daily habits worth tracking:**
• Weight (consistency matters more than daily changes)
• Nutrition (balanced meals)
• Exercise (mix cardio and strength training)
• Hydration (8-10 glasses of water a day)
• Sleep (7-9 hours a night)

**Quick tips:**
✅ Log activities regularly for better insights
✅ Focus on progress, not perfection
✅ Celebrate small wins

Keep tracking, and I'll give you a personalized analysis once the quota is back! 💪

Please ask me to analyze your habits again later."
        ),
        (CallSite::ActivityLog, Locale::ZhTw) => format!(
            "{banner}

我已經收到你的活動訊息：「{message}」

雖然無法使用 AI 智能提取，但我仍然記錄了你的訊息。
請繼續記錄你的健康活動，等配額恢復後我會提供更好的數據提取功能！

你可以繼續：
• 記錄每日活動
• 詢問基本健康問題
• 要求簡單的建議

謝謝你的理解！💪"
        ),
        (CallSite::ActivityLog, Locale::En) => format!(
            "{banner}

I received your activity message: \"{message}\"

I can't extract the details with AI right now, but your message has been noted.
Keep logging your activities; extraction will be back once the quota recovers!

You can still:
• Log daily activities
• Ask basic health questions
• Request simple suggestions

Thanks for understanding! 💪"
        ),
        (CallSite::Chat, Locale::ZhTw) => format!(
            "{banner}

針對你的問題：「{message}」

以下是一些基本健康建議：

💤 **睡眠**：成人建議每晚 7-9 小時
💧 **水分**：每天 8-10 杯水 (約 2-2.5 公升)
🏃 **運動**：每週至少 150 分鐘中等強度運動
🍎 **飲食**：每天 5 份蔬果，均衡營養

我仍然可以幫你：
• 記錄活動數據
• 提供基本健康建議
• 回答常見健康問題

有其他問題請繼續問我！💪"
        ),
        (CallSite::Chat, Locale::En) => format!(
            "{banner}

About your question: \"{message}\"

Here are some basic health guidelines:

💤 **Sleep**: adults need 7-9 hours a night
💧 **Water**: 8-10 glasses a day (about 2-2.5 liters)
🏃 **Exercise**: at least 150 minutes of moderate activity a week
🍎 **Diet**: 5 servings of fruit and vegetables a day

I can still help you:
• Log activity data
• Give basic health advice
• Answer common health questions

Feel free to keep asking! 💪"
        ),
    }
}

fn other_text(site: CallSite, locale: Locale) -> String {
    let text = match (site, locale) {
        (CallSite::MealPlan, Locale::En) => {
            "Sorry, I'm having trouble generating a meal plan right now. Please try asking for a specific type of meal plan (like 'healthy breakfast ideas' or 'vegetarian lunch plan')."
        }
        (CallSite::MealPlan, Locale::ZhTw) => {
            "抱歉，目前無法產生餐點計劃。請試著提出更具體的需求（例如「健康早餐建議」或「素食午餐計劃」）。"
        }
        (CallSite::WorkoutPlan, Locale::En) => {
            "Sorry, I'm having trouble generating a workout plan right now. Please try asking for a specific type of workout (like 'beginner home workout' or '30-minute cardio routine')."
        }
        (CallSite::WorkoutPlan, Locale::ZhTw) => {
            "抱歉，目前無法產生運動計劃。請試著提出更具體的需求（例如「初學者居家運動」或「30 分鐘有氧訓練」）。"
        }
        (CallSite::HabitAnalysis, Locale::En) => {
            "📊 Health Analysis

I'm having trouble generating a detailed analysis right now, but here are some general health tips:

**Daily Habits to Track:**
• Weight (consistency matters more than daily changes)
• Nutrition (aim for balanced meals)
• Exercise (mix cardio and strength training)
• Hydration (8-10 glasses of water daily)
• Sleep (7-9 hours nightly)

**Quick Tips:**
✅ Log activities regularly for better insights
✅ Focus on progress, not perfection
✅ Celebrate small wins

Keep tracking your activities, and I'll provide more personalized insights as we gather more data! 💪

Try asking me to analyze your habits again later."
        }
        (CallSite::HabitAnalysis, Locale::ZhTw) => {
            "📊 健康分析

目前無法產生詳細分析，以下是一些通用健康建議：

**建議追蹤的日常習慣：**
• 體重（重視一致性而非每日變化）
• 營養（均衡飲食）
• 運動（有氧和力量訓練結合）
• 水分攝取（每日 8-10 杯水）
• 睡眠（每晚 7-9 小時）

**快速小貼士：**
✅ 定期記錄活動以獲得更好的洞察
✅ 專注於進步，而非完美
✅ 慶祝小勝利

持續記錄你的活動，資料越多分析越個人化！💪

請稍後再請我分析你的習慣。"
        }
        (CallSite::ActivityLog, Locale::En) => {
            "Sorry, I couldn't process your activity data. Please try again with a clearer format like 'I weighed 70kg today and had a salad for lunch'."
        }
        (CallSite::ActivityLog, Locale::ZhTw) => {
            "抱歉，我無法處理你的活動資料。請換個更清楚的說法再試一次，例如「我今天體重 70 公斤，午餐吃了沙拉」。"
        }
        (CallSite::Chat, Locale::En) => {
            "Hello! 👋 I'm your health assistant!

I can help you with:
🍎 Meal planning - ask \"suggest a meal plan\"
💪 Workout plans - say \"I need a workout plan\"
📊 Activity logging - tell me \"I ran 5km today\"
📈 Health analysis - ask \"analyze my habits\"

What would you like to know about health and fitness? 💪"
        }
        (CallSite::Chat, Locale::ZhTw) => {
            "你好！👋 我是你的健康小幫手！

我可以幫你：
🍎 餐點規劃 - 試試「幫我規劃餐點」
💪 運動計劃 - 說「我需要運動計劃」
📊 活動記錄 - 告訴我「我今天跑了 5 公里」
📈 健康分析 - 問我「分析我的習慣」

想了解哪些健康或健身的資訊呢？💪"
        }
    };
    text.to_string()
}
